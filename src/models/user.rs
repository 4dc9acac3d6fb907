use crate::entities::{UserRole, users};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    #[schema(example = "m.hosseini")]
    pub username: String,
    #[schema(example = "m.hosseini@seraj.ac.ir")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "09123456789")]
    pub phone: String,
    pub landline: Option<String>,
    #[schema(example = "male")]
    pub gender: String,
    pub province: String,
    pub city: String,
    pub university: String,
    pub faculty: String,
    pub address: Option<String>,

    // student fields
    pub student_id: Option<String>,
    pub entrance_year: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,

    // professor fields
    pub academic_rank: Option<String>,
    pub specialization: Option<String>,
    pub teaching_experience: Option<i32>,
    pub professor_code: Option<String>,
    pub office_hours: Option<String>,
    pub website: Option<String>,

    // staff fields
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub office_phone: Option<String>,
    pub responsibility: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "m.hosseini")]
    pub username_or_email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub landline: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub university: Option<String>,
    pub faculty: Option<String>,
    pub address: Option<String>,
    pub student_id: Option<String>,
    pub entrance_year: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub academic_rank: Option<String>,
    pub specialization: Option<String>,
    pub teaching_experience: Option<i32>,
    pub office_hours: Option<String>,
    pub website: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub office_phone: Option<String>,
    pub responsibility: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub landline: Option<String>,
    pub gender: String,
    pub user_type: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub student_id: Option<String>,
    pub entrance_year: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub academic_rank: Option<String>,
    pub specialization: Option<String>,
    pub teaching_experience: Option<i32>,
    pub professor_code: Option<String>,
    pub office_hours: Option<String>,
    pub website: Option<String>,
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub office_phone: Option<String>,
    pub responsibility: Option<String>,
    pub province: String,
    pub city: String,
    pub university: String,
    pub faculty: String,
    pub address: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        let full_name = user.full_name();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            full_name,
            phone: user.phone,
            landline: user.landline,
            gender: user.gender,
            user_type: user.user_type,
            is_verified: user.is_verified,
            verified_at: user.verified_at,
            student_id: user.student_id,
            entrance_year: user.entrance_year,
            degree: user.degree,
            field_of_study: user.field_of_study,
            academic_rank: user.academic_rank,
            specialization: user.specialization,
            teaching_experience: user.teaching_experience,
            professor_code: user.professor_code,
            office_hours: user.office_hours,
            website: user.website,
            employee_id: user.employee_id,
            department: user.department,
            position: user.position,
            office_phone: user.office_phone,
            responsibility: user.responsibility,
            province: user.province,
            city: user.city,
            university: user.university,
            faculty: user.faculty,
            address: user.address,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_type: Option<String>,
    pub role: Option<String>,
    pub is_verified: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyUserRequest {
    pub notes: Option<String>,
}
