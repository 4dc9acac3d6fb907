use crate::entities::{EventType, events, registrations};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Tajweed workshop")]
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    /// Absent means unlimited capacity.
    pub capacity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub event_type: Option<EventType>,
    pub search: Option<String>,
    /// Only events that have not started yet.
    pub upcoming: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub current_participants: i32,
    pub remaining_capacity: Option<i32>,
    pub is_full: bool,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<events::Model> for EventResponse {
    fn from(event: events::Model) -> Self {
        let remaining_capacity = event.remaining_capacity();
        let is_full = event.is_full();
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            event_type: event.event_type,
            start_date: event.start_date,
            end_date: event.end_date,
            location: event.location,
            capacity: event.capacity,
            current_participants: event.current_participants,
            remaining_capacity,
            is_full,
            is_active: event.is_active,
            created_by: event.created_by,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub registration_date: DateTime<Utc>,
    pub status: String,
    pub attended: bool,
}

impl From<registrations::Model> for RegistrationResponse {
    fn from(registration: registrations::Model) -> Self {
        Self {
            id: registration.id,
            user_id: registration.user_id,
            event_id: registration.event_id,
            registration_date: registration.registration_date,
            status: registration.status,
            attended: registration.attended,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyEventResponse {
    pub event: EventResponse,
    pub registration: RegistrationResponse,
}

/// One row of an event's registration sheet (admin view).
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrantResponse {
    pub registration_id: i64,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub registration_date: DateTime<Utc>,
    pub attended: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendedRequest {
    pub attended: bool,
}
