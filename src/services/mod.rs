pub mod access;
pub mod ai_service;
pub mod auth_service;
pub mod circle_service;
pub mod event_service;
pub mod notification_service;
pub mod session_service;
pub mod user_service;

pub use ai_service::*;
pub use auth_service::*;
pub use circle_service::*;
pub use event_service::*;
pub use notification_service::*;
pub use session_service::SessionService;
pub use user_service::*;
