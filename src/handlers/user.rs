use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::{CircleService, EventService, UserService};

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.get_profile(user_id).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/user/profile",
    tag = "user",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.update_profile(user_id, request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/my-events",
    tag = "user",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own event registrations"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_events(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.my_events(user_id, &query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/my-circles",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circles the user belongs to"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_circles(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.my_circles(user_id).await {
        Ok(circles) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": circles
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/my-events", web::get().to(my_events))
            .route("/my-circles", web::get().to(my_circles)),
    );
}
