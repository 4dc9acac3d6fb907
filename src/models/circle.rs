use crate::entities::{CircleRole, circle_files, quran_circles};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCircleRequest {
    #[schema(example = "Morning tajweed circle")]
    pub name: String,
    pub description: Option<String>,
    pub teacher_name: String,
    pub teacher_bio: Option<String>,
    /// general, memorization, tajweed or tafsir.
    pub circle_type: Option<String>,
    /// beginner, intermediate or advanced.
    pub level: Option<String>,
    pub days_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub is_online: Option<bool>,
    pub online_link: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCircleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub teacher_name: Option<String>,
    pub teacher_bio: Option<String>,
    pub circle_type: Option<String>,
    pub level: Option<String>,
    pub days_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub is_online: Option<bool>,
    pub online_link: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CircleQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub circle_type: Option<String>,
    pub level: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CircleResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub teacher_name: String,
    pub teacher_bio: Option<String>,
    pub circle_type: String,
    pub level: String,
    pub days_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub is_online: bool,
    pub online_link: Option<String>,
    pub capacity: Option<i32>,
    pub current_members: i32,
    pub remaining_capacity: Option<i32>,
    pub is_full: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<quran_circles::Model> for CircleResponse {
    fn from(circle: quran_circles::Model) -> Self {
        let remaining_capacity = circle.remaining_capacity();
        let is_full = circle.is_full();
        Self {
            id: circle.id,
            name: circle.name,
            description: circle.description,
            teacher_name: circle.teacher_name,
            teacher_bio: circle.teacher_bio,
            circle_type: circle.circle_type,
            level: circle.level,
            days_of_week: circle.days_of_week,
            start_time: circle.start_time,
            end_time: circle.end_time,
            location: circle.location,
            is_online: circle.is_online,
            online_link: circle.online_link,
            capacity: circle.capacity,
            current_members: circle.current_members,
            remaining_capacity,
            is_full,
            is_active: circle.is_active,
            created_at: circle.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CircleDetailResponse {
    pub circle: CircleResponse,
    /// Whether the requesting user holds an active membership.
    pub is_member: bool,
    pub membership_role: Option<CircleRole>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    Joined,
    Rejoined,
    /// Active membership already existed; the join was a no-op.
    AlreadyMember,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JoinCircleResponse {
    pub status: JoinStatus,
    pub current_members: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CircleMemberResponse {
    pub member_id: i64,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: CircleRole,
    pub is_active: bool,
    pub joined_date: DateTime<Utc>,
    /// Percentage of held sessions attended, 0 when nothing has been held.
    pub attendance_rate: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CircleFileResponse {
    pub id: i64,
    pub circle_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
    pub is_public: bool,
    pub download_count: i64,
}

impl From<circle_files::Model> for CircleFileResponse {
    fn from(file: circle_files::Model) -> Self {
        Self {
            id: file.id,
            circle_id: file.circle_id,
            title: file.title,
            description: file.description,
            file_path: file.file_path,
            file_type: file.file_type,
            file_size: file.file_size,
            uploaded_at: file.uploaded_at,
            is_public: file.is_public,
            download_count: file.download_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddFileRequest {
    pub title: String,
    pub description: Option<String>,
    /// Storage path or URL of the already-uploaded file.
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub is_public: Option<bool>,
}
