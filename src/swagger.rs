use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{CircleRole, EventType, UserRole};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register_student,
        handlers::auth::register_professor,
        handlers::auth::register_staff,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::my_events,
        handlers::user::my_circles,
        handlers::event::list_events,
        handlers::event::get_event,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::register_for_event,
        handlers::event::cancel_registration,
        handlers::event::event_registrations,
        handlers::event::mark_attended,
        handlers::circle::list_circles,
        handlers::circle::get_circle,
        handlers::circle::create_circle,
        handlers::circle::update_circle,
        handlers::circle::delete_circle,
        handlers::circle::join_circle,
        handlers::circle::leave_circle,
        handlers::circle::circle_members,
        handlers::circle::circle_sessions,
        handlers::circle::create_session,
        handlers::circle::circle_files,
        handlers::circle::add_circle_file,
        handlers::circle::download_circle_file,
        handlers::circle::member_attendance_rate,
        handlers::session::get_session,
        handlers::session::update_session,
        handlers::session::mark_attendance,
        handlers::session::session_files,
        handlers::session::download_session_file,
        handlers::notification::list_notifications,
        handlers::notification::mark_read,
        handlers::notification::mark_all_read,
        handlers::ai::ask,
        handlers::ai::history,
        handlers::ai::daily_verse,
        handlers::admin::list_users,
        handlers::admin::toggle_user,
        handlers::admin::change_role,
        handlers::admin::verify_user,
        handlers::admin::reports,
    ),
    components(
        schemas(
            UserRole,
            EventType,
            CircleRole,
            RegisterUserRequest,
            LoginRequest,
            RefreshTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UpdateProfileRequest,
            UserResponse,
            AuthResponse,
            AdminUserQuery,
            ChangeRoleRequest,
            VerifyUserRequest,
            CreateEventRequest,
            UpdateEventRequest,
            EventQuery,
            EventResponse,
            RegistrationResponse,
            MyEventResponse,
            RegistrantResponse,
            MarkAttendedRequest,
            CreateCircleRequest,
            UpdateCircleRequest,
            CircleQuery,
            CircleResponse,
            CircleDetailResponse,
            JoinStatus,
            JoinCircleResponse,
            CircleMemberResponse,
            CircleFileResponse,
            AddFileRequest,
            CreateSessionRequest,
            UpdateSessionRequest,
            SessionQuery,
            SessionResponse,
            SessionDetailResponse,
            MarkAttendanceRequest,
            AttendanceResponse,
            AttendanceRateResponse,
            SessionFileResponse,
            NotificationResponse,
            UnreadCountResponse,
            AskQuestionRequest,
            AiQuestionResponse,
            VerseResponse,
            ReportTotals,
            EventParticipationRow,
            DailyRegistrationRow,
            UniversityStatRow,
            ReportsResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and authentication"),
        (name = "user", description = "Own profile and memberships"),
        (name = "events", description = "Events and registrations"),
        (name = "circles", description = "Recitation circles"),
        (name = "sessions", description = "Circle sessions and attendance"),
        (name = "notifications", description = "In-app notifications"),
        (name = "ai", description = "Quranic Q&A"),
        (name = "admin", description = "Administration")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
