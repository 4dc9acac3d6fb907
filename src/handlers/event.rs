use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::EventService;

#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Page size"),
        ("event_type" = Option<String>, Query, description = "Filter by event type"),
        ("search" = Option<String>, Query, description = "Search in title and description"),
        ("upcoming" = Option<bool>, Query, description = "Only not-yet-started events")
    ),
    responses((status = 200, description = "Active events"))
)]
pub async fn list_events(
    event_service: web::Data<EventService>,
    query: web::Query<EventQuery>,
) -> Result<HttpResponse> {
    match event_service.list_events(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{event_id}",
    tag = "events",
    params(("event_id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event detail", body = EventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.get_event(path.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Event created", body = EventResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.create_event(user_id, request.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/events/{event_id}",
    tag = "events",
    request_body = UpdateEventRequest,
    params(("event_id" = i64, Path, description = "Event id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn update_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service
        .update_event(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/events/{event_id}",
    tag = "events",
    params(("event_id" = i64, Path, description = "Event id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Event deleted, registrations cascade"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn delete_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.delete_event(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Event deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{event_id}/register",
    tag = "events",
    params(("event_id" = i64, Path, description = "Event id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered", body = RegistrationResponse),
        (status = 409, description = "Inactive, full or already registered")
    )
)]
pub async fn register_for_event(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.register(user_id, path.into_inner()).await {
        Ok(registration) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": registration,
            "message": "Registration confirmed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/{event_id}/cancel",
    tag = "events",
    params(("event_id" = i64, Path, description = "Event id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registration cancelled"),
        (status = 409, description = "Event already started")
    )
)]
pub async fn cancel_registration(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.cancel(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Registration cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/registrations",
    tag = "events",
    params(
        ("event_id" = i64, Path, description = "Event id"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registration sheet"),
        (status = 403, description = "Admin or manager only")
    )
)]
pub async fn event_registrations(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service
        .event_registrants(user_id, path.into_inner(), &query.into_inner())
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
    path = "/events/registrations/{registration_id}/attended",
    tag = "events",
    request_body = MarkAttendedRequest,
    params(("registration_id" = i64, Path, description = "Registration id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance flag updated", body = RegistrationResponse),
        (status = 403, description = "Admin or manager only")
    )
)]
pub async fn mark_attended(
    event_service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<MarkAttendedRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service
        .mark_attended(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(registration) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": registration
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("", web::get().to(list_events))
            .route("", web::post().to(create_event))
            .route(
                "/registrations/{registration_id}/attended",
                web::post().to(mark_attended),
            )
            .route("/{event_id}", web::get().to(get_event))
            .route("/{event_id}", web::put().to(update_event))
            .route("/{event_id}", web::delete().to(delete_event))
            .route("/{event_id}/register", web::post().to(register_for_event))
            .route("/{event_id}/cancel", web::post().to(cancel_registration))
            .route(
                "/{event_id}/registrations",
                web::get().to(event_registrations),
            ),
    );
}
