//! Persistence seam for subscription records.
//!
//! The domain service only talks to [`SubscriptionStore`]; the sea-orm backend
//! is used in production and the in-memory backend for tests and local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{SpendFilter, Subscription};

pub mod memory;
pub mod sea_orm_store;

pub use memory::InMemorySubscriptionStore;
pub use sea_orm_store::SeaOrmSubscriptionStore;

/// Backend failure. Not interpreted or retried by the domain layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    #[error("subscription {0} already exists")]
    Duplicate(Uuid),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts a new record and returns it as persisted.
    async fn insert(&self, subscription: &Subscription) -> StoreResult<Subscription>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Subscription>>;

    /// Overwrites the mutable columns of the row with `subscription.id`.
    ///
    /// Returns `false` when no such row exists.
    async fn update(&self, subscription: &Subscription) -> StoreResult<bool>;

    /// Returns `false` when no such row exists.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// All subscriptions of one user, most recent `start_date` first.
    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>>;

    /// Sum of `price` over every record matching `filter`, 0 when none do.
    async fn sum_overlapping(&self, filter: &SpendFilter) -> StoreResult<i64>;
}
