use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Event is not active")]
    EventInactive,

    #[error("Event capacity exceeded")]
    CapacityExceeded,

    #[error("Already registered for this event")]
    DuplicateRegistration,

    #[error("Not registered for this event")]
    NotRegistered,

    #[error("Event has already started")]
    EventAlreadyStarted,

    #[error("Circle capacity exceeded")]
    CircleFull,

    #[error("Not a member of this circle")]
    NotAMember,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string())
            }
            AppError::EventInactive => (StatusCode::CONFLICT, "EVENT_INACTIVE", self.to_string()),
            AppError::CapacityExceeded => {
                (StatusCode::CONFLICT, "CAPACITY_EXCEEDED", self.to_string())
            }
            AppError::DuplicateRegistration => (
                StatusCode::CONFLICT,
                "DUPLICATE_REGISTRATION",
                self.to_string(),
            ),
            AppError::NotRegistered => (StatusCode::NOT_FOUND, "NOT_REGISTERED", self.to_string()),
            AppError::EventAlreadyStarted => (
                StatusCode::CONFLICT,
                "EVENT_ALREADY_STARTED",
                self.to_string(),
            ),
            AppError::CircleFull => (StatusCode::CONFLICT, "CIRCLE_FULL", self.to_string()),
            AppError::NotAMember => (StatusCode::NOT_FOUND, "NOT_A_MEMBER", self.to_string()),
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                (StatusCode::BAD_GATEWAY, "EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
