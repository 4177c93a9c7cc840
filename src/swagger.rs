use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::list_subscriptions,
        handlers::analytics::total_spent,
    ),
    components(
        schemas(
            Subscription,
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            TotalSpentResponse,
            ApiError,
        )
    ),
    tags(
        (name = "subscription", description = "Subscription records API"),
        (name = "analytics", description = "Spend aggregation API"),
    ),
    info(
        title = "Subscription Tracker API",
        version = "1.0.0",
        description = "REST API for tracking user subscriptions and their spend"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
