pub mod analytics;
pub mod health;
pub mod subscription;

pub use analytics::analytics_config;
pub use health::health_config;
pub use subscription::subscription_config;

use crate::error::AppError;
use actix_web::web;

/// Malformed JSON bodies and query strings answer with the same envelope as domain errors.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    );
}

/// Routes mounted under `/api/v1`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(subscription_config)
        .configure(analytics_config);
}
