use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "participant")]
    Participant,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Participant => write!(f, "participant"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub landline: Option<String>,
    pub gender: String,
    pub user_type: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<i64>,
    pub verification_notes: Option<String>,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
    #[sea_orm(has_many = "super::notifications::Entity")]
    Notifications,
    #[sea_orm(has_many = "super::circle_members::Entity")]
    CircleMemberships,
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl Related<super::notifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl Related<super::circle_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CircleMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins count as managers everywhere a manager is required.
    pub fn is_manager(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Manager)
    }
}
