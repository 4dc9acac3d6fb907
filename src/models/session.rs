use crate::entities::{circle_sessions, session_attendances, session_files};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub homework: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    pub session_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub verses_reviewed: Option<String>,
    pub notes: Option<String>,
    pub homework: Option<String>,
    /// Flipped to true once the session has actually taken place.
    pub is_held: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// "upcoming", "past" or "all" (default).
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: i64,
    pub circle_id: i64,
    pub title: Option<String>,
    pub session_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub topic: Option<String>,
    pub description: Option<String>,
    pub verses_reviewed: Option<String>,
    pub notes: Option<String>,
    pub homework: Option<String>,
    pub is_held: bool,
    pub created_at: DateTime<Utc>,
}

impl From<circle_sessions::Model> for SessionResponse {
    fn from(session: circle_sessions::Model) -> Self {
        Self {
            id: session.id,
            circle_id: session.circle_id,
            title: session.title,
            session_date: session.session_date,
            start_time: session.start_time,
            end_time: session.end_time,
            topic: session.topic,
            description: session.description,
            verses_reviewed: session.verses_reviewed,
            notes: session.notes,
            homework: session.homework,
            is_held: session.is_held,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    pub member_id: i64,
    pub attended: bool,
    pub late_minutes: Option<i32>,
    pub excuse: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: i64,
    pub session_id: i64,
    pub member_id: i64,
    pub attended: bool,
    pub excuse: Option<String>,
    pub late_minutes: i32,
    pub marked_by: Option<i64>,
    pub marked_at: DateTime<Utc>,
}

impl From<session_attendances::Model> for AttendanceResponse {
    fn from(attendance: session_attendances::Model) -> Self {
        Self {
            id: attendance.id,
            session_id: attendance.session_id,
            member_id: attendance.member_id,
            attended: attendance.attended,
            excuse: attendance.excuse,
            late_minutes: attendance.late_minutes,
            marked_by: attendance.marked_by,
            marked_at: attendance.marked_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDetailResponse {
    pub session: SessionResponse,
    pub attendances: Vec<AttendanceResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceRateResponse {
    pub member_id: i64,
    pub held_sessions: i64,
    pub attended_sessions: i64,
    /// round(100 * attended / held), 0 when no session has been held.
    pub attendance_rate: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionFileResponse {
    pub id: i64,
    pub session_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
    pub download_count: i64,
}

impl From<session_files::Model> for SessionFileResponse {
    fn from(file: session_files::Model) -> Self {
        Self {
            id: file.id,
            session_id: file.session_id,
            title: file.title,
            description: file.description,
            file_path: file.file_path,
            file_type: file.file_type,
            file_size: file.file_size,
            uploaded_at: file.uploaded_at,
            download_count: file.download_count,
        }
    }
}
