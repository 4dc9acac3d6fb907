use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "circle_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quran_circles::Entity",
        from = "Column::CircleId",
        to = "super::quran_circles::Column::Id"
    )]
    Circle,
    #[sea_orm(has_many = "super::session_attendances::Entity")]
    Attendances,
    #[sea_orm(has_many = "super::session_files::Entity")]
    Files,
}

impl Related<super::quran_circles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Circle.def()
    }
}

impl Related<super::session_attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl Related<super::session_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
