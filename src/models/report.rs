use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportTotals {
    pub total_users: i64,
    pub pending_verifications: i64,
    pub total_events: i64,
    pub active_circles: i64,
    pub total_registrations: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventParticipationRow {
    pub event_id: i64,
    pub title: String,
    pub registrations: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyRegistrationRow {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UniversityStatRow {
    pub university: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportsResponse {
    pub totals: ReportTotals,
    /// Ten most subscribed events.
    pub event_participation: Vec<EventParticipationRow>,
    /// Registration counts for the last 30 distinct days.
    pub daily_registrations: Vec<DailyRegistrationRow>,
    /// Ten largest user populations by university.
    pub university_stats: Vec<UniversityStatRow>,
}
