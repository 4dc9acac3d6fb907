use crate::entities::{
    event_entity as events, registration_entity as registrations, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateEventRequest, EventQuery, EventResponse, MarkAttendedRequest, MyEventResponse,
    PaginatedResponse, PaginationParams, RegistrantResponse, RegistrationResponse,
    UpdateEventRequest,
};
use crate::services::access;
use crate::services::NotificationService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
    notification_service: NotificationService,
}

impl EventService {
    pub fn new(pool: DatabaseConnection, notification_service: NotificationService) -> Self {
        Self {
            pool,
            notification_service,
        }
    }

    pub async fn list_events(&self, query: &EventQuery) -> AppResult<PaginatedResponse<EventResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query =
            events::Entity::find().filter(events::Column::IsActive.eq(true));

        if let Some(event_type) = &query.event_type {
            base_query = base_query.filter(events::Column::EventType.eq(event_type.clone()));
        }
        if let Some(search) = &query.search {
            base_query = base_query.filter(
                Condition::any()
                    .add(events::Column::Title.contains(search))
                    .add(events::Column::Description.contains(search)),
            );
        }
        if query.upcoming.unwrap_or(false) {
            base_query = base_query.filter(events::Column::StartDate.gt(Utc::now()));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_asc(events::Column::StartDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<EventResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, &params, total))
    }

    pub async fn get_event(&self, event_id: i64) -> AppResult<EventResponse> {
        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        Ok(event.into())
    }

    pub async fn create_event(
        &self,
        acting_user_id: i64,
        request: CreateEventRequest,
    ) -> AppResult<EventResponse> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        Self::validate_schedule(request.start_date, request.end_date)?;
        Self::validate_capacity(request.capacity)?;

        let event = events::ActiveModel {
            title: Set(request.title),
            description: Set(request.description),
            event_type: Set(request.event_type),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            location: Set(request.location),
            capacity: Set(request.capacity),
            current_participants: Set(0),
            is_active: Set(true),
            created_by: Set(Some(actor.id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let event = event.insert(&self.pool).await?;
        log::info!("Event {} created by user {}", event.id, actor.id);
        Ok(event.into())
    }

    pub async fn update_event(
        &self,
        acting_user_id: i64,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> AppResult<EventResponse> {
        access::require_admin(&self.pool, acting_user_id).await?;

        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let start_date = request.start_date.unwrap_or(event.start_date);
        let end_date = request.end_date.unwrap_or(event.end_date);
        Self::validate_schedule(start_date, end_date)?;
        if let Some(capacity) = request.capacity {
            Self::validate_capacity(Some(capacity))?;
        }

        let mut model = event.into_active_model();
        if let Some(title) = request.title {
            model.title = Set(title);
        }
        if let Some(description) = request.description {
            model.description = Set(description);
        }
        if let Some(event_type) = request.event_type {
            model.event_type = Set(event_type);
        }
        if request.start_date.is_some() {
            model.start_date = Set(start_date);
        }
        if request.end_date.is_some() {
            model.end_date = Set(end_date);
        }
        if let Some(location) = request.location {
            model.location = Set(Some(location));
        }
        if let Some(capacity) = request.capacity {
            model.capacity = Set(Some(capacity));
        }
        if let Some(is_active) = request.is_active {
            model.is_active = Set(is_active);
        }

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Deleting an event drops its registrations with it (cascade).
    pub async fn delete_event(&self, acting_user_id: i64, event_id: i64) -> AppResult<()> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let title = event.title.clone();
        event.delete(&self.pool).await?;
        log::info!("Event \"{}\" deleted by user {}", title, actor.id);
        Ok(())
    }

    /// Registers a user for an event.
    ///
    /// The registration row and the participant counter move together inside
    /// one transaction. The counter update is guarded by the capacity
    /// predicate itself, so two racing registrations cannot both take the
    /// last slot: the loser's update touches zero rows and the whole
    /// transaction rolls back with `CapacityExceeded`.
    pub async fn register(&self, user_id: i64, event_id: i64) -> AppResult<RegistrationResponse> {
        let user = access::load_actor(&self.pool, user_id).await?;

        let txn = self.pool.begin().await?;

        let event = events::Entity::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if !event.is_active {
            return Err(AppError::EventInactive);
        }
        if event.is_full() {
            return Err(AppError::CapacityExceeded);
        }

        let existing = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(user_id))
            .filter(registrations::Column::EventId.eq(event_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::DuplicateRegistration);
        }

        let registration = registrations::ActiveModel {
            user_id: Set(user_id),
            event_id: Set(event_id),
            registration_date: Set(Utc::now()),
            status: Set("registered".to_string()),
            attended: Set(false),
            ..Default::default()
        };

        // The unique (user_id, event_id) index stops duplicate races the
        // pre-check cannot see.
        let registration = match registration.insert(&txn).await {
            Ok(model) => model,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::DuplicateRegistration);
            }
            Err(e) => return Err(e.into()),
        };

        let result = events::Entity::update_many()
            .col_expr(
                events::Column::CurrentParticipants,
                Expr::col(events::Column::CurrentParticipants).add(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .filter(
                Condition::any()
                    .add(events::Column::Capacity.is_null())
                    .add(
                        Expr::col(events::Column::CurrentParticipants)
                            .lt(Expr::col(events::Column::Capacity)),
                    ),
            )
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::CapacityExceeded);
        }

        txn.commit().await?;

        log::info!("User {} registered for event {}", user_id, event_id);

        self.notification_service
            .notify(
                user_id,
                "Event registration",
                &format!("You are registered for \"{}\".", event.title),
            )
            .await;
        self.notification_service
            .notify_admins(
                "New event registration",
                &format!("{} registered for \"{}\".", user.full_name(), event.title),
            )
            .await;

        Ok(registration.into())
    }

    /// Cancels a registration before the event starts and releases the slot.
    pub async fn cancel(&self, user_id: i64, event_id: i64) -> AppResult<()> {
        access::load_actor(&self.pool, user_id).await?;

        let txn = self.pool.begin().await?;

        let registration = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(user_id))
            .filter(registrations::Column::EventId.eq(event_id))
            .one(&txn)
            .await?
            .ok_or(AppError::NotRegistered)?;

        let event = events::Entity::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if Utc::now() >= event.start_date {
            return Err(AppError::EventAlreadyStarted);
        }

        registration.delete(&txn).await?;

        events::Entity::update_many()
            .col_expr(
                events::Column::CurrentParticipants,
                Expr::col(events::Column::CurrentParticipants).sub(1),
            )
            .filter(events::Column::Id.eq(event_id))
            .filter(events::Column::CurrentParticipants.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!("User {} cancelled registration for event {}", user_id, event_id);

        self.notification_service
            .notify(
                user_id,
                "Registration cancelled",
                &format!("Your registration for \"{}\" was cancelled.", event.title),
            )
            .await;

        Ok(())
    }

    /// Post-hoc attendance flag on a registration. No counter interaction.
    pub async fn mark_attended(
        &self,
        acting_user_id: i64,
        registration_id: i64,
        request: MarkAttendedRequest,
    ) -> AppResult<RegistrationResponse> {
        access::require_manager(&self.pool, acting_user_id).await?;

        let registration = registrations::Entity::find_by_id(registration_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        let mut model = registration.into_active_model();
        model.attended = Set(request.attended);
        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn my_events(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<MyEventResponse>> {
        let base_query = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .find_also_related(events::Entity)
            .order_by_desc(registrations::Column::RegistrationDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<MyEventResponse> = rows
            .into_iter()
            .filter_map(|(registration, event)| {
                event.map(|event| MyEventResponse {
                    event: event.into(),
                    registration: registration.into(),
                })
            })
            .collect();

        Ok(PaginatedResponse::from_params(data, params, total))
    }

    /// Registration sheet for one event (admin/manager view).
    pub async fn event_registrants(
        &self,
        acting_user_id: i64,
        event_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<RegistrantResponse>> {
        access::require_manager(&self.pool, acting_user_id).await?;

        events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let base_query = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .find_also_related(users::Entity)
            .order_by_asc(registrations::Column::RegistrationDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<RegistrantResponse> = rows
            .into_iter()
            .filter_map(|(registration, user)| {
                user.map(|user| RegistrantResponse {
                    registration_id: registration.id,
                    user_id: user.id,
                    username: user.username.clone(),
                    full_name: user.full_name(),
                    registration_date: registration.registration_date,
                    attended: registration.attended,
                })
            })
            .collect();

        Ok(PaginatedResponse::from_params(data, params, total))
    }

    fn validate_schedule(
        start_date: chrono::DateTime<Utc>,
        end_date: chrono::DateTime<Utc>,
    ) -> AppResult<()> {
        if end_date <= start_date {
            return Err(AppError::ValidationError(
                "End date must be after start date".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_capacity(capacity: Option<i32>) -> AppResult<()> {
        if let Some(capacity) = capacity
            && capacity <= 0
        {
            return Err(AppError::ValidationError(
                "Capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::{create_test_event, create_test_user, setup_test_db};

    fn service(db: &DatabaseConnection) -> EventService {
        EventService::new(db.clone(), NotificationService::new(db.clone()))
    }

    async fn current_participants(db: &DatabaseConnection, event_id: i64) -> i32 {
        events::Entity::find_by_id(event_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .current_participants
    }

    #[tokio::test]
    async fn test_register_increments_counter() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Workshop", Some(10), 24).await;
        let service = service(&db);

        let registration = service.register(user.id, event.id).await.unwrap();
        assert_eq!(registration.event_id, event.id);
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Workshop", Some(10), 24).await;
        let service = service(&db);

        service.register(user.id, event.id).await.unwrap();
        let second = service.register(user.id, event.id).await;

        assert!(matches!(second, Err(AppError::DuplicateRegistration)));
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_capacity_is_never_exceeded() {
        let db = setup_test_db().await;
        let event = create_test_event(&db, "Small hall", Some(2), 24).await;
        let service = service(&db);

        let mut failures = 0;
        for i in 0..4 {
            let user = create_test_user(&db, &format!("student{i}"), UserRole::Participant).await;
            match service.register(user.id, event.id).await {
                Ok(_) => {}
                Err(AppError::CapacityExceeded) => failures += 1,
                Err(e) => panic!("unexpected error: {e:?}"),
            }
        }

        assert_eq!(failures, 2);
        assert_eq!(current_participants(&db, event.id).await, 2);
        let rows = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[tokio::test]
    async fn test_capacity_loser_leaves_no_row() {
        let db = setup_test_db().await;
        let event = create_test_event(&db, "Single seat", Some(1), 24).await;
        let service = service(&db);

        let winner = create_test_user(&db, "winner", UserRole::Participant).await;
        let loser = create_test_user(&db, "loser", UserRole::Participant).await;

        service.register(winner.id, event.id).await.unwrap();
        let result = service.register(loser.id, event.id).await;
        assert!(matches!(result, Err(AppError::CapacityExceeded)));

        let loser_rows = registrations::Entity::find()
            .filter(registrations::Column::UserId.eq(loser.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(loser_rows, 0);
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_register_cancel_register_again() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Workshop", Some(5), 24).await;
        let service = service(&db);

        service.register(user.id, event.id).await.unwrap();
        service.cancel(user.id, event.id).await.unwrap();
        assert_eq!(current_participants(&db, event.id).await, 0);

        service.register(user.id, event.id).await.unwrap();
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_cancel_without_registration() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Workshop", Some(5), 24).await;
        let service = service(&db);

        let result = service.cancel(user.id, event.id).await;
        assert!(matches!(result, Err(AppError::NotRegistered)));
    }

    #[tokio::test]
    async fn test_cancel_after_start_rejected() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        // started an hour ago
        let event = create_test_event(&db, "Started", Some(5), -1).await;
        let service = service(&db);

        service.register(user.id, event.id).await.unwrap();
        let result = service.cancel(user.id, event.id).await;

        assert!(matches!(result, Err(AppError::EventAlreadyStarted)));
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_register_inactive_event() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Hidden", Some(5), 24).await;
        let service = service(&db);

        service
            .update_event(
                admin.id,
                event.id,
                UpdateEventRequest {
                    title: None,
                    description: None,
                    event_type: None,
                    start_date: None,
                    end_date: None,
                    location: None,
                    capacity: None,
                    is_active: Some(false),
                },
            )
            .await
            .unwrap();

        let result = service.register(user.id, event.id).await;
        assert!(matches!(result, Err(AppError::EventInactive)));
    }

    #[tokio::test]
    async fn test_unlimited_capacity_event() {
        let db = setup_test_db().await;
        let event = create_test_event(&db, "Open lecture", None, 24).await;
        let service = service(&db);

        for i in 0..5 {
            let user = create_test_user(&db, &format!("guest{i}"), UserRole::Participant).await;
            service.register(user.id, event.id).await.unwrap();
        }

        assert_eq!(current_participants(&db, event.id).await, 5);
    }

    #[tokio::test]
    async fn test_mark_attended_requires_manager() {
        let db = setup_test_db().await;
        let student = create_test_user(&db, "student1", UserRole::Participant).await;
        let manager = create_test_user(&db, "manager", UserRole::Manager).await;
        let event = create_test_event(&db, "Workshop", Some(5), 24).await;
        let service = service(&db);

        let registration = service.register(student.id, event.id).await.unwrap();

        let denied = service
            .mark_attended(student.id, registration.id, MarkAttendedRequest { attended: true })
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden)));

        let updated = service
            .mark_attended(manager.id, registration.id, MarkAttendedRequest { attended: true })
            .await
            .unwrap();
        assert!(updated.attended);
        // counter untouched
        assert_eq!(current_participants(&db, event.id).await, 1);
    }

    #[tokio::test]
    async fn test_delete_event_cascades_registrations() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let user = create_test_user(&db, "student1", UserRole::Participant).await;
        let event = create_test_event(&db, "Doomed", Some(5), 24).await;
        let service = service(&db);

        service.register(user.id, event.id).await.unwrap();
        service.delete_event(admin.id, event.id).await.unwrap();

        let rows = registrations::Entity::find()
            .filter(registrations::Column::EventId.eq(event.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
