use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("user_type" = Option<String>, Query, description = "student, professor or staff"),
        ("role" = Option<String>, Query, description = "admin, manager or participant"),
        ("is_verified" = Option<bool>, Query, description = "Verification state"),
        ("search" = Option<String>, Query, description = "Search in username, email and name")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User list"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<AdminUserQuery>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.list_users(user_id, &query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/toggle",
    tag = "admin",
    params(("user_id" = i64, Path, description = "Target user id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active flag flipped", body = UserResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn toggle_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.toggle_active(user_id, path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/role",
    tag = "admin",
    request_body = ChangeRoleRequest,
    params(("user_id" = i64, Path, description = "Target user id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn change_role(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service
        .change_role(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/verify",
    tag = "admin",
    request_body = VerifyUserRequest,
    params(("user_id" = i64, Path, description = "Target user id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Account verified and activated", body = UserResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn verify_user(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<VerifyUserRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service
        .verify_user(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/reports",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform statistics", body = ReportsResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn reports(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.reports(user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::get().to(list_users))
            .route("/users/{user_id}/toggle", web::post().to(toggle_user))
            .route("/users/{user_id}/role", web::post().to(change_role))
            .route("/users/{user_id}/verify", web::post().to(verify_user))
            .route("/reports", web::get().to(reports)),
    );
}
