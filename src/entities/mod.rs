pub mod ai_questions;
pub mod circle_files;
pub mod circle_members;
pub mod circle_sessions;
pub mod events;
pub mod notifications;
pub mod password_reset_tokens;
pub mod quran_circles;
pub mod quran_verses;
pub mod registrations;
pub mod session_attendances;
pub mod session_files;
pub mod users;

pub use circle_members::CircleRole;
pub use events::EventType;
pub use users::UserRole;

pub use ai_questions as ai_question_entity;
pub use circle_files as circle_file_entity;
pub use circle_members as circle_member_entity;
pub use circle_sessions as circle_session_entity;
pub use events as event_entity;
pub use notifications as notification_entity;
pub use password_reset_tokens as password_reset_token_entity;
pub use quran_circles as quran_circle_entity;
pub use quran_verses as quran_verse_entity;
pub use registrations as registration_entity;
pub use session_attendances as session_attendance_entity;
pub use session_files as session_file_entity;
pub use users as user_entity;
