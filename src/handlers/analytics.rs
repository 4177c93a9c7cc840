use super::subscription::parse_uuid;
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/analytics/total",
    tag = "analytics",
    params(TotalSpentQuery),
    responses(
        (status = 200, description = "Total price of subscriptions active in the window", body = TotalSpentResponse),
        (status = 400, description = "Invalid month token or user_id", body = ApiError)
    )
)]
pub async fn total_spent(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<TotalSpentQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    // empty query values mean "no filter"
    let user_id = match query.user_id.as_deref().filter(|v| !v.is_empty()) {
        Some(v) => Some(parse_uuid(v, "user_id")?),
        None => None,
    };
    let service_name = query.service_name.filter(|v| !v.is_empty());

    match subscription_service
        .total_spent(&query.from, &query.to, user_id, service_name)
        .await
    {
        Ok(total) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(TotalSpentResponse { total })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn analytics_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/analytics").route("/total", web::get().to(total_spent)));
}
