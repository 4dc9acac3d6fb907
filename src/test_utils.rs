//! Helpers for service tests: an in-memory SQLite database with the real
//! migrations applied, plus seed functions for the common entities.

use crate::entities::{
    CircleRole, EventType, UserRole, circle_member_entity as circle_members,
    circle_session_entity as circle_sessions, event_entity as events,
    quran_circle_entity as circles, user_entity as users,
};
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

pub async fn setup_test_db() -> DatabaseConnection {
    // One connection only: every pooled connection to sqlite::memory: would
    // otherwise be its own empty database.
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: UserRole,
) -> users::Model {
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@seraj.ac.ir")),
        password_hash: Set("not-a-real-hash".to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set(username.to_string()),
        phone: Set("09123456789".to_string()),
        gender: Set("other".to_string()),
        user_type: Set("student".to_string()),
        is_verified: Set(true),
        province: Set("Tehran".to_string()),
        city: Set("Tehran".to_string()),
        university: Set("University of Tehran".to_string()),
        faculty: Set("Theology".to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    user.insert(db).await.expect("insert test user")
}

/// Creates an active event whose start lies `start_in_hours` from now
/// (negative values produce an already started event).
pub async fn create_test_event(
    db: &DatabaseConnection,
    title: &str,
    capacity: Option<i32>,
    start_in_hours: i64,
) -> events::Model {
    let start = Utc::now() + Duration::hours(start_in_hours);
    let event = events::ActiveModel {
        title: Set(title.to_string()),
        description: Set("Test event".to_string()),
        event_type: Set(EventType::Workshop),
        start_date: Set(start),
        end_date: Set(start + Duration::hours(2)),
        capacity: Set(capacity),
        current_participants: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    event.insert(db).await.expect("insert test event")
}

pub async fn create_test_circle(
    db: &DatabaseConnection,
    name: &str,
    capacity: Option<i32>,
) -> circles::Model {
    let circle = circles::ActiveModel {
        name: Set(name.to_string()),
        teacher_name: Set("Ostad Test".to_string()),
        circle_type: Set("general".to_string()),
        level: Set("beginner".to_string()),
        is_online: Set(false),
        capacity: Set(capacity),
        current_members: Set(0),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    circle.insert(db).await.expect("insert test circle")
}

pub async fn create_test_session(
    db: &DatabaseConnection,
    circle_id: i64,
    is_held: bool,
) -> circle_sessions::Model {
    let session = circle_sessions::ActiveModel {
        circle_id: Set(circle_id),
        session_date: Set(Utc::now().date_naive()),
        is_held: Set(is_held),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    session.insert(db).await.expect("insert test session")
}

/// Inserts an active membership row directly, keeping the member counter in
/// step with it.
pub async fn join_as(
    db: &DatabaseConnection,
    circle_id: i64,
    user_id: i64,
    role: CircleRole,
) -> circle_members::Model {
    let member = circle_members::ActiveModel {
        circle_id: Set(circle_id),
        user_id: Set(user_id),
        joined_date: Set(Utc::now()),
        is_active: Set(true),
        role: Set(role),
        ..Default::default()
    };
    let member = member.insert(db).await.expect("insert test membership");

    circles::Entity::update_many()
        .col_expr(
            circles::Column::CurrentMembers,
            Expr::col(circles::Column::CurrentMembers).add(1),
        )
        .filter(circles::Column::Id.eq(circle_id))
        .exec(db)
        .await
        .expect("bump member counter");

    member
}
