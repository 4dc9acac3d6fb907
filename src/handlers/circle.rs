use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::{get_user_id_from_request, require_user_id};
use crate::models::*;
use crate::services::{CircleService, SessionService};

#[utoipa::path(
    get,
    path = "/circles",
    tag = "circles",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("circle_type" = Option<String>, Query, description = "Filter by circle type"),
        ("level" = Option<String>, Query, description = "Filter by level"),
        ("search" = Option<String>, Query, description = "Search in name, description and teacher")
    ),
    responses((status = 200, description = "Active circles"))
)]
pub async fn list_circles(
    circle_service: web::Data<CircleService>,
    query: web::Query<CircleQuery>,
) -> Result<HttpResponse> {
    match circle_service.list_circles(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/circles/{circle_id}",
    tag = "circles",
    params(("circle_id" = i64, Path, description = "Circle id")),
    responses(
        (status = 200, description = "Circle detail with membership status"),
        (status = 404, description = "Circle not found")
    )
)]
pub async fn get_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = get_user_id_from_request(&req);

    match circle_service.get_circle(user_id, path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": detail
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles",
    tag = "circles",
    request_body = CreateCircleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circle created", body = CircleResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    request: web::Json<CreateCircleRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.create_circle(user_id, request.into_inner()).await {
        Ok(circle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": circle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/circles/{circle_id}",
    tag = "circles",
    request_body = UpdateCircleRequest,
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circle updated", body = CircleResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn update_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCircleRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service
        .update_circle(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(circle) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": circle
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/circles/{circle_id}",
    tag = "circles",
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circle deleted, members and sessions cascade"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn delete_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.delete_circle(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Circle deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles/{circle_id}/join",
    tag = "circles",
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Joined, rejoined or already a member", body = JoinCircleResponse),
        (status = 409, description = "Circle is full")
    )
)]
pub async fn join_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.join(user_id, path.into_inner()).await {
        Ok(response) => {
            let message = match response.status {
                JoinStatus::Joined => "Membership confirmed",
                JoinStatus::Rejoined => "Membership reactivated",
                JoinStatus::AlreadyMember => "You are already a member of this circle",
            };
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles/{circle_id}/leave",
    tag = "circles",
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Left the circle"),
        (status = 404, description = "No active membership")
    )
)]
pub async fn leave_circle(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.leave(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "You left the circle"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/circles/{circle_id}/members",
    tag = "circles",
    params(
        ("circle_id" = i64, Path, description = "Circle id"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Member roster with attendance rates"),
        (status = 403, description = "Teacher or admin only")
    )
)]
pub async fn circle_members(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service
        .members(user_id, path.into_inner(), &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/circles/{circle_id}/sessions",
    tag = "circles",
    params(
        ("circle_id" = i64, Path, description = "Circle id"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("status" = Option<String>, Query, description = "upcoming, past or all")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circle sessions"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn circle_sessions(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<SessionQuery>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service
        .list_sessions(user_id, path.into_inner(), &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles/{circle_id}/sessions",
    tag = "circles",
    request_body = CreateSessionRequest,
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session created", body = SessionResponse),
        (status = 403, description = "Teacher or admin only")
    )
)]
pub async fn create_session(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<CreateSessionRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service
        .create_session(user_id, path.into_inner(), request.into_inner())
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
    get,
    path = "/circles/{circle_id}/files",
    tag = "circles",
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Circle files"),
        (status = 404, description = "Not a member")
    )
)]
pub async fn circle_files(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.list_files(user_id, path.into_inner()).await {
        Ok(files) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": files
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles/{circle_id}/files",
    tag = "circles",
    request_body = AddFileRequest,
    params(("circle_id" = i64, Path, description = "Circle id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "File metadata registered", body = CircleFileResponse),
        (status = 403, description = "Teacher or admin only")
    )
)]
pub async fn add_circle_file(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddFileRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service
        .add_file(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(file) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": file
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/circles/files/{file_id}/download",
    tag = "circles",
    params(("file_id" = i64, Path, description = "File id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "File resolved, download counted", body = CircleFileResponse),
        (status = 403, description = "File is not public")
    )
)]
pub async fn download_circle_file(
    circle_service: web::Data<CircleService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match circle_service.download_file(user_id, path.into_inner()).await {
        Ok(file) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": file
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/circles/members/{member_id}/attendance-rate",
    tag = "circles",
    params(("member_id" = i64, Path, description = "Circle member id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance statistics", body = AttendanceRateResponse),
        (status = 403, description = "Self, teacher or admin only")
    )
)]
pub async fn member_attendance_rate(
    session_service: web::Data<SessionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match session_service
        .attendance_rate(user_id, path.into_inner())
        .await
    {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn circle_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/circles")
            .route("", web::get().to(list_circles))
            .route("", web::post().to(create_circle))
            .route(
                "/members/{member_id}/attendance-rate",
                web::get().to(member_attendance_rate),
            )
            .route(
                "/files/{file_id}/download",
                web::post().to(download_circle_file),
            )
            .route("/{circle_id}", web::get().to(get_circle))
            .route("/{circle_id}", web::put().to(update_circle))
            .route("/{circle_id}", web::delete().to(delete_circle))
            .route("/{circle_id}/join", web::post().to(join_circle))
            .route("/{circle_id}/leave", web::post().to(leave_circle))
            .route("/{circle_id}/members", web::get().to(circle_members))
            .route("/{circle_id}/sessions", web::get().to(circle_sessions))
            .route("/{circle_id}/sessions", web::post().to(create_session))
            .route("/{circle_id}/files", web::get().to(circle_files))
            .route("/{circle_id}/files", web::post().to(add_circle_file)),
    );
}
