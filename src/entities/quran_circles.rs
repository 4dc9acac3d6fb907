use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "quran_circles")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::circle_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::circle_sessions::Entity")]
    Sessions,
    #[sea_orm(has_many = "super::circle_files::Entity")]
    Files,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::circle_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::circle_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::circle_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.current_members >= cap)
    }

    pub fn remaining_capacity(&self) -> Option<i32> {
        self.capacity.map(|cap| cap - self.current_members)
    }
}
