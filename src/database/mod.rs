pub mod connection;

pub use connection::*;

use crate::config::{DatabaseConfig, StorageBackend};
use crate::error::AppResult;
use crate::store::{InMemorySubscriptionStore, SeaOrmSubscriptionStore, SubscriptionStore};
use std::sync::Arc;

/// Builds the configured store; the postgres backend is connected and migrated first.
pub async fn create_store(config: &DatabaseConfig) -> AppResult<Arc<dyn SubscriptionStore>> {
    match config.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(config).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(SeaOrmSubscriptionStore::new(pool)))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory subscription store; data is lost on restart");
            Ok(Arc::new(InMemorySubscriptionStore::new()))
        }
    }
}
