use crate::config::SubscriptionSettings;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::store::SubscriptionStore;
use crate::utils::{normalize_end, normalize_start};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Subscription lifecycle and spend aggregation.
///
/// Holds no state between calls: every operation goes to the store, and
/// `update` re-reads the current row before merging into it. There is no
/// version check between that read and the write, so concurrent updates of
/// one id are last-writer-wins and an update racing a delete may end in
/// `NotFound`.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    settings: SubscriptionSettings,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>, settings: SubscriptionSettings) -> Self {
        Self { store, settings }
    }

    pub async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> AppResult<Subscription> {
        validate_service_name(&request.service_name)?;
        validate_price(request.price)?;
        let start_date = normalize_start(&request.start_date)?;

        let now = db_now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: request.service_name,
            price: request.price,
            user_id: request.user_id,
            start_date,
            end_date: None,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert(&subscription).await?)
    }

    pub async fn get_subscription(&self, id: Uuid) -> AppResult<Subscription> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update_subscription(
        &self,
        id: Uuid,
        request: UpdateSubscriptionRequest,
    ) -> AppResult<Subscription> {
        let mut subscription = self.get_subscription(id).await?;

        merge_update(&mut subscription, request)?;
        if self.settings.enforce_date_order {
            check_date_order(&subscription)?;
        }
        subscription.updated_at = db_now();

        // the row can disappear between the read above and this write
        if !self.store.update(&subscription).await? {
            return Err(not_found(id));
        }
        Ok(subscription)
    }

    pub async fn delete_subscription(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub async fn list_user_subscriptions(&self, user_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self.store.list_by_user(user_id).await?)
    }

    /// Total price of every subscription active at some point between the
    /// start of month `from` and the end of month `to`.
    pub async fn total_spent(
        &self,
        from: &str,
        to: &str,
        user_id: Option<Uuid>,
        service_name: Option<String>,
    ) -> AppResult<i64> {
        let filter = SpendFilter {
            from: normalize_start(from)?,
            to: normalize_end(to)?,
            user_id,
            service_name,
        };
        Ok(self.store.sum_overlapping(&filter).await?)
    }
}

/// Current time at microsecond precision, the resolution of `timestamptz`,
/// so what update returns equals what a later read gives back.
fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Subscription {id} not found"))
}

fn validate_service_name(service_name: &str) -> AppResult<()> {
    if service_name.trim().is_empty() {
        log::warn!("Rejected subscription with empty service name");
        return Err(AppError::ValidationError(
            "service_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: i32) -> AppResult<()> {
    if price < 1 {
        log::warn!("Rejected subscription price {price}");
        return Err(AppError::ValidationError(
            "price must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Field-by-field PATCH merge; fields absent from `request` are kept.
fn merge_update(
    subscription: &mut Subscription,
    request: UpdateSubscriptionRequest,
) -> AppResult<()> {
    if let Some(service_name) = request.service_name {
        validate_service_name(&service_name)?;
        subscription.service_name = service_name;
    }
    if let Some(price) = request.price {
        validate_price(price)?;
        subscription.price = price;
    }
    if let Some(start) = request.start_date {
        subscription.start_date = normalize_start(&start)?;
    }
    match request.end_date.as_deref() {
        None => {}
        Some("") => subscription.end_date = None,
        Some(end) => subscription.end_date = Some(normalize_end(end)?),
    }
    Ok(())
}

fn check_date_order(subscription: &Subscription) -> AppResult<()> {
    if let Some(end) = subscription.end_date
        && end < subscription.start_date
    {
        log::warn!(
            "Rejected subscription {}: end {end} precedes start {}",
            subscription.id,
            subscription.start_date
        );
        return Err(AppError::ValidationError(
            "end_date must not precede start_date".to_string(),
        ));
    }
    Ok(())
}
