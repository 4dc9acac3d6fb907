use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "quran_verses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub surah_name: String,
    pub surah_number: i32,
    pub verse_number: i32,
    pub verse_arabic: String,
    pub translation: Option<String>,
    pub topic: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
