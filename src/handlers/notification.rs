use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::NotificationService;

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own notifications"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    let params = query.into_inner();
    let list = notification_service.list(user_id, &params).await;
    let unread = notification_service.unread_count(user_id).await;

    match (list, unread) {
        (Ok(response), Ok(unread_count)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response,
            "unread_count": unread_count
        }))),
        (Err(e), _) | (_, Err(e)) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/notifications/{notification_id}/read",
    tag = "notifications",
    params(("notification_id" = i64, Path, description = "Notification id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Marked as read"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match notification_service
        .mark_read(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Notification marked as read"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All notifications marked as read"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn mark_all_read(
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match notification_service.mark_all_read(user_id).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "updated": updated }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/read-all", web::post().to(mark_all_read))
            .route("/{notification_id}/read", web::post().to(mark_read)),
    );
}
