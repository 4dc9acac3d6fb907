use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::AuthService;

#[utoipa::path(
    post,
    path = "/auth/register/student",
    tag = "auth",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Student account created", body = AuthResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn register_student(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    match auth_service.register_student(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register/professor",
    tag = "auth",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Professor application submitted", body = UserResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn register_professor(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    match auth_service.register_professor(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user,
            "message": "Your application was submitted. You can sign in after an admin approves it."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register/staff",
    tag = "auth",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "Staff application submitted", body = UserResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn register_staff(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse> {
    match auth_service.register_staff(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": user,
            "message": "Your application was submitted. You can sign in after an admin approves it."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = AuthResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued when the email exists")
    )
)]
pub async fn forgot_password(
    auth_service: web::Data<AuthService>,
    request: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    match auth_service.forgot_password(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "If the email is registered, a reset link has been issued."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    auth_service: web::Data<AuthService>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    match auth_service.reset_password(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Your password was changed. Please sign in."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register/student", web::post().to(register_student))
            .route("/register/professor", web::post().to(register_professor))
            .route("/register/staff", web::post().to(register_staff))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password)),
    );
}
