pub mod admin;
pub mod ai;
pub mod auth;
pub mod circle;
pub mod event;
pub mod notification;
pub mod session;
pub mod user;

pub use admin::admin_config;
pub use ai::ai_config;
pub use auth::auth_config;
pub use circle::circle_config;
pub use event::event_config;
pub use notification::notification_config;
pub use session::session_config;
pub use user::user_config;

use crate::error::AppError;
use actix_web::{HttpMessage, HttpRequest};

/// Identity attached by the auth middleware, when one was presented.
pub(crate) fn get_user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

/// Identity required; public-path requests without a token end up here.
pub(crate) fn require_user_id(req: &HttpRequest) -> Result<i64, AppError> {
    get_user_id_from_request(req)
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
