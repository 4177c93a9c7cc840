use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::{StoreResult, SubscriptionStore};
use crate::entities::subscription_entity as subs;
use crate::models::{SpendFilter, Subscription};

/// Postgres-backed store over the `subscriptions` table.
#[derive(Clone)]
pub struct SeaOrmSubscriptionStore {
    pool: DatabaseConnection,
}

impl SeaOrmSubscriptionStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

fn to_active_model(s: &Subscription) -> subs::ActiveModel {
    subs::ActiveModel {
        id: Set(s.id),
        service_name: Set(s.service_name.clone()),
        price: Set(s.price),
        user_id: Set(s.user_id),
        start_date: Set(s.start_date),
        end_date: Set(s.end_date),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

/// Newest start first; ties fall back to creation time, then id.
fn list_query(user_id: Uuid) -> Select<subs::Entity> {
    subs::Entity::find()
        .filter(subs::Column::UserId.eq(user_id))
        .order_by_desc(subs::Column::StartDate)
        .order_by_desc(subs::Column::CreatedAt)
        .order_by_asc(subs::Column::Id)
}

/// `SUM(price)` over rows overlapping the window, plus the optional equality filters.
fn spend_query(filter: &SpendFilter) -> Select<subs::Entity> {
    let mut query = subs::Entity::find()
        .filter(subs::Column::StartDate.lte(filter.to))
        .filter(
            Condition::any()
                .add(subs::Column::EndDate.is_null())
                .add(subs::Column::EndDate.gte(filter.from)),
        );
    if let Some(user_id) = filter.user_id {
        query = query.filter(subs::Column::UserId.eq(user_id));
    }
    if let Some(service_name) = &filter.service_name {
        query = query.filter(subs::Column::ServiceName.eq(service_name.as_str()));
    }
    query
        .select_only()
        .column_as(Expr::col(subs::Column::Price).sum(), "total")
}

#[async_trait]
impl SubscriptionStore for SeaOrmSubscriptionStore {
    async fn insert(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let model = to_active_model(subscription)
            .insert(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to create subscription: {e}"))?;
        log::info!("Subscription created: id={}", model.id);
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Subscription>> {
        let model = subs::Entity::find_by_id(id)
            .one(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to get subscription {id}: {e}"))?;
        Ok(model.map(Subscription::from))
    }

    async fn update(&self, subscription: &Subscription) -> StoreResult<bool> {
        let id = subscription.id;
        let result = subs::Entity::update_many()
            .col_expr(
                subs::Column::ServiceName,
                Expr::value(subscription.service_name.clone()),
            )
            .col_expr(subs::Column::Price, Expr::value(subscription.price))
            .col_expr(subs::Column::StartDate, Expr::value(subscription.start_date))
            .col_expr(subs::Column::EndDate, Expr::value(subscription.end_date))
            .col_expr(subs::Column::UpdatedAt, Expr::value(subscription.updated_at))
            .filter(subs::Column::Id.eq(id))
            .exec(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to update subscription {id}: {e}"))?;

        if result.rows_affected > 0 {
            log::info!("Subscription updated: id={id}");
        }
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = subs::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to delete subscription {id}: {e}"))?;

        if result.rows_affected > 0 {
            log::info!("Subscription deleted: id={id}");
        }
        Ok(result.rows_affected > 0)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let models = list_query(user_id)
            .all(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to list subscriptions of user {user_id}: {e}"))?;
        log::debug!(
            "Retrieved {} subscriptions for user {user_id}",
            models.len()
        );
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    async fn sum_overlapping(&self, filter: &SpendFilter) -> StoreResult<i64> {
        #[derive(Debug, FromQueryResult)]
        struct TotalRow {
            total: Option<i64>,
        }
        let total = spend_query(filter)
            .into_model::<TotalRow>()
            .one(&self.pool)
            .await
            .inspect_err(|e| log::error!("Failed to calculate total spent ({filter:?}): {e}"))?
            .and_then(|r| r.total)
            .unwrap_or(0);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DbBackend, QueryTrait};

    fn filter() -> SpendFilter {
        SpendFilter {
            from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
            user_id: None,
            service_name: None,
        }
    }

    #[test]
    fn test_spend_query_overlap_predicate() {
        let sql = spend_query(&filter()).build(DbBackend::Postgres).to_string();
        assert!(sql.contains("SUM("), "{sql}");
        assert!(sql.contains(r#""subscriptions"."start_date" <="#), "{sql}");
        assert!(
            sql.contains(
                r#""subscriptions"."end_date" IS NULL OR "subscriptions"."end_date" >="#
            ),
            "{sql}"
        );
        assert!(!sql.contains("user_id"), "{sql}");
        assert!(!sql.contains("service_name"), "{sql}");
    }

    #[test]
    fn test_spend_query_optional_filters() {
        let mut f = filter();
        f.user_id = Some(Uuid::nil());
        f.service_name = Some("Netflix".to_string());
        let sql = spend_query(&f).build(DbBackend::Postgres).to_string();
        assert!(sql.contains(r#""subscriptions"."user_id" = "#), "{sql}");
        assert!(
            sql.contains(r#""subscriptions"."service_name" = 'Netflix'"#),
            "{sql}"
        );
    }

    #[test]
    fn test_list_query_has_total_order() {
        let sql = list_query(Uuid::nil())
            .build(DbBackend::Postgres)
            .to_string();
        assert!(
            sql.contains(
                r#"ORDER BY "subscriptions"."start_date" DESC, "subscriptions"."created_at" DESC, "subscriptions"."id" ASC"#
            ),
            "{sql}"
        );
    }
}
