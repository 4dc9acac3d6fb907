use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "session_attendances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub member_id: i64,
    pub attended: bool,
    pub excuse: Option<String>,
    pub late_minutes: i32,
    pub marked_by: Option<i64>,
    pub marked_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::circle_sessions::Entity",
        from = "Column::SessionId",
        to = "super::circle_sessions::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::circle_members::Entity",
        from = "Column::MemberId",
        to = "super::circle_members::Column::Id"
    )]
    Member,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::MarkedBy",
        to = "super::users::Column::Id"
    )]
    Marker,
}

impl Related<super::circle_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::circle_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
