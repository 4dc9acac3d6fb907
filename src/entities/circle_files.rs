use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "circle_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub circle_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_by: Option<i64>,
    pub uploaded_at: DateTime<Utc>,
    pub is_public: bool,
    pub download_count: i64,
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
        from = "Column::UploadedBy",
        to = "super::users::Column::Id"
    )]
    Uploader,
}

impl Related<super::quran_circles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Circle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
