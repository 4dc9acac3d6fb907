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
pub enum EventType {
    #[sea_orm(string_value = "workshop")]
    Workshop,
    #[sea_orm(string_value = "competition")]
    Competition,
    #[sea_orm(string_value = "halaqah")]
    Halaqah,
    #[sea_orm(string_value = "lecture")]
    Lecture,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Workshop => write!(f, "workshop"),
            EventType::Competition => write!(f, "competition"),
            EventType::Halaqah => write!(f, "halaqah"),
            EventType::Lecture => write!(f, "lecture"),
            EventType::Other => write!(f, "other"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub current_participants: i32,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.current_participants >= cap)
    }

    /// None means unlimited capacity.
    pub fn remaining_capacity(&self) -> Option<i32> {
        self.capacity.map(|cap| cap - self.current_participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(capacity: Option<i32>, current: i32) -> Model {
        Model {
            id: 1,
            title: "Tajweed workshop".to_string(),
            description: "Intro".to_string(),
            event_type: EventType::Workshop,
            start_date: Utc::now(),
            end_date: Utc::now(),
            location: None,
            capacity,
            current_participants: current,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_full() {
        assert!(!event(None, 1000).is_full());
        assert!(!event(Some(10), 9).is_full());
        assert!(event(Some(10), 10).is_full());
    }

    #[test]
    fn test_remaining_capacity() {
        assert_eq!(event(None, 5).remaining_capacity(), None);
        assert_eq!(event(Some(10), 4).remaining_capacity(), Some(6));
    }
}
