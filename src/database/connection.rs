use crate::config::DatabaseConfig;
use crate::error::AppResult;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

/// Connects and pings, retrying up to `connect_retries` times.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(30 * 60))
        .max_lifetime(Duration::from_secs(60 * 60))
        .sqlx_logging(false);

    let mut attempt = 1;
    loop {
        log::info!(
            "Connecting to database (attempt {attempt}/{})",
            config.connect_retries
        );
        match connect(&options).await {
            Ok(pool) => {
                log::info!("Connected to database on attempt {attempt}");
                return Ok(pool);
            }
            Err(e) if attempt < config.connect_retries => {
                log::warn!(
                    "Database connection attempt {attempt} failed: {e}; retrying in {}s",
                    config.retry_delay_secs
                );
                tokio::time::sleep(Duration::from_secs(config.retry_delay_secs)).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("Unable to connect to database after {attempt} attempts: {e}");
                return Err(e.into());
            }
        }
    }
}

async fn connect(options: &ConnectOptions) -> Result<DbPool, DbErr> {
    let pool = Database::connect(options.clone()).await?;
    pool.ping().await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}
