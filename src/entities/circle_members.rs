use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(50))")]
#[serde(rename_all = "snake_case")]
pub enum CircleRole {
    #[sea_orm(string_value = "member")]
    Member,
    #[sea_orm(string_value = "assistant")]
    Assistant,
    #[sea_orm(string_value = "teacher")]
    Teacher,
}

impl std::fmt::Display for CircleRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircleRole::Member => write!(f, "member"),
            CircleRole::Assistant => write!(f, "assistant"),
            CircleRole::Teacher => write!(f, "teacher"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "circle_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub circle_id: i64,
    pub user_id: i64,
    pub joined_date: DateTime<Utc>,
    pub is_active: bool,
    pub role: CircleRole,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quran_circles::Entity",
        from = "Column::CircleId",
        to = "super::quran_circles::Column::Id"
    )]
    Circle,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::session_attendances::Entity")]
    Attendances,
}

impl Related<super::quran_circles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Circle.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::session_attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
