use crate::entities::subscription_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A user's subscription to a paid service.
///
/// `start_date` is always the first instant of its month and `end_date`, when
/// present, the last instant of its month. An absent `end_date` means the
/// subscription is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<subscription_entity::Model> for Subscription {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "07-2025")]
    pub start_date: String, // MM-YYYY
}

/// Partial update: omitted fields keep their stored value.
///
/// `end_date: ""` clears the end date, making the subscription open-ended.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: Option<String>,
    #[schema(example = 500)]
    pub price: Option<i32>,
    #[schema(example = "07-2025")]
    pub start_date: Option<String>,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionListQuery {
    /// Owner of the subscriptions
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalSpentQuery {
    /// First month of the window (MM-YYYY)
    pub from: String,
    /// Last month of the window (MM-YYYY), inclusive
    pub to: String,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalSpentResponse {
    pub total: i64,
}

/// Selection for the spend aggregation: every subscription active at some
/// point in `[from, to]`, optionally narrowed to one user and/or one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendFilter {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl SpendFilter {
    /// Open-ended subscriptions pass the lower bound unconditionally.
    pub fn overlaps(&self, sub: &Subscription) -> bool {
        sub.start_date <= self.to && sub.end_date.is_none_or(|end| end >= self.from)
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        self.overlaps(sub)
            && self.user_id.is_none_or(|id| id == sub.user_id)
            && self
                .service_name
                .as_deref()
                .is_none_or(|name| name == sub.service_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn month_start(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
    }

    fn subscription(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".to_string(),
            price: 100,
            user_id: Uuid::nil(),
            start_date: start,
            end_date: end,
            created_at: start,
            updated_at: start,
        }
    }

    fn window() -> SpendFilter {
        SpendFilter {
            from: month_start(2024, 1),
            to: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
            user_id: None,
            service_name: None,
        }
    }

    #[test]
    fn test_overlap_rules() {
        let filter = window();
        // open-ended, started inside
        assert!(filter.overlaps(&subscription(month_start(2024, 1), None)));
        // open-ended, started long before
        assert!(filter.overlaps(&subscription(month_start(2020, 5), None)));
        // starts after the window
        assert!(!filter.overlaps(&subscription(month_start(2024, 4), None)));
        // ended before the window
        let ended = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert!(!filter.overlaps(&subscription(month_start(2023, 1), Some(ended))));
        // ends on the first day of the window
        assert!(filter.overlaps(&subscription(
            month_start(2023, 1),
            Some(month_start(2024, 1))
        )));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let owner = Uuid::new_v4();
        let mut sub = subscription(month_start(2024, 2), None);
        sub.user_id = owner;

        let mut filter = window();
        filter.user_id = Some(owner);
        filter.service_name = Some("Netflix".to_string());
        assert!(filter.matches(&sub));

        filter.service_name = Some("Spotify".to_string());
        assert!(!filter.matches(&sub));

        filter.service_name = None;
        filter.user_id = Some(Uuid::new_v4());
        assert!(!filter.matches(&sub));
    }
}
