use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::SessionService;

#[utoipa::path(
    get,
    path = "/sessions/{session_id}",
    tag = "sessions",
    params(("session_id" = i64, Path, description = "Session id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session detail with attendance sheet"),
        (status = 404, description = "Session not found or not a member")
    )
)]
pub async fn get_session(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service.get_session(user_id, path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/sessions/{session_id}",
    tag = "sessions",
    request_body = UpdateSessionRequest,
    params(("session_id" = i64, Path, description = "Session id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session updated", body = SessionResponse),
        (status = 403, description = "Teacher or admin only")
    )
)]
pub async fn update_session(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateSessionRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service
        .update_session(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sessions/{session_id}/attendance",
    tag = "sessions",
    request_body = MarkAttendanceRequest,
    params(("session_id" = i64, Path, description = "Session id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance recorded", body = AttendanceResponse),
        (status = 403, description = "Teacher or admin only")
    )
)]
pub async fn mark_attendance(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<MarkAttendanceRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service
        .mark_attendance(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(attendance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": attendance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/sessions/{session_id}/files",
    tag = "sessions",
    params(("session_id" = i64, Path, description = "Session id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session files"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn session_files(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service.list_files(user_id, path.into_inner()).await {
        Ok(files) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": files
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sessions/files/{file_id}/download",
    tag = "sessions",
    params(("file_id" = i64, Path, description = "File id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "File resolved, download counted", body = SessionFileResponse),
        (status = 404, description = "Not a member")
    )
)]
pub async fn download_session_file(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service.download_file(user_id, path.into_inner()).await {
        Ok(file) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": file
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn session_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sessions")
            .route(
                "/files/{file_id}/download",
                web::post().to(download_session_file),
            )
            .route("/{session_id}", web::get().to(get_session))
            .route("/{session_id}", web::put().to(update_session))
            .route("/{session_id}/attendance", web::post().to(mark_attendance))
            .route("/{session_id}/files", web::get().to(session_files)),
    );
}
