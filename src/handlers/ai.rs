use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::require_user_id;
use crate::models::*;
use crate::services::AiService;

#[utoipa::path(
    post,
    path = "/ai/ask",
    tag = "ai",
    request_body = AskQuestionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Answered", body = AiQuestionResponse),
        (status = 502, description = "Completion API unavailable")
    )
)]
pub async fn ask(
    ai_service: web::Data<AiService>,
    req: HttpRequest,
    request: web::Json<AskQuestionRequest>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match ai_service.ask(user_id, request.into_inner()).await {
        Ok(answer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": answer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ai/history",
    tag = "ai",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own question history"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn history(
    ai_service: web::Data<AiService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = match require_user_id(&req) {
        Ok(user_id) => user_id,
        Err(e) => return Ok(e.error_response()),
    };

    match ai_service.history(user_id, &query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ai/verse/daily",
    tag = "ai",
    responses(
        (status = 200, description = "Verse of the day", body = VerseResponse),
        (status = 404, description = "No verses available")
    )
)]
pub async fn daily_verse(ai_service: web::Data<AiService>) -> Result<HttpResponse> {
    match ai_service.daily_verse().await {
        Ok(verse) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": verse
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn ai_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ai")
            .route("/ask", web::post().to(ask))
            .route("/history", web::get().to(history))
            .route("/verse/daily", web::get().to(daily_verse)),
    );
}
