use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

pub(crate) fn parse_uuid(value: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::ValidationError(format!("Invalid {field}: '{value}'")))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid field or month token", body = ApiError)
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .create_subscription(request.into_inner())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Created().json(ApiResponse::success(subscription))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed ID", body = ApiError),
        (status = 404, description = "No such subscription", body = ApiError)
    )
)]
pub async fn get_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_uuid(&path, "subscription id")?;
    match subscription_service.get_subscription(id).await {
        Ok(subscription) => Ok(HttpResponse::Ok().json(ApiResponse::success(subscription))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = String, Path, description = "Subscription ID")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = Subscription),
        (status = 400, description = "Invalid field or month token", body = ApiError),
        (status = 404, description = "No such subscription", body = ApiError)
    )
)]
pub async fn update_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let id = parse_uuid(&path, "subscription id")?;
    match subscription_service
        .update_subscription(id, request.into_inner())
        .await
    {
        Ok(subscription) => Ok(HttpResponse::Ok().json(ApiResponse::success(subscription))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Malformed ID", body = ApiError),
        (status = 404, description = "No such subscription", body = ApiError)
    )
)]
pub async fn delete_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = parse_uuid(&path, "subscription id")?;
    match subscription_service.delete_subscription(id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(SubscriptionListQuery),
    responses(
        (status = 200, description = "Subscriptions of the user, newest start first", body = [Subscription]),
        (status = 400, description = "Missing or malformed user_id", body = ApiError)
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionListQuery>,
) -> Result<HttpResponse> {
    let user_id = match query.user_id.as_deref().filter(|v| !v.is_empty()) {
        Some(v) => parse_uuid(v, "user_id")?,
        None => {
            return Ok(AppError::ValidationError(
                "user_id query parameter is required".to_string(),
            )
            .error_response());
        }
    };

    match subscription_service.list_user_subscriptions(user_id).await {
        Ok(subscriptions) => Ok(HttpResponse::Ok().json(ApiResponse::success(subscriptions))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::patch().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
