use crate::entities::{
    UserRole, event_entity as events, quran_circle_entity as circles,
    registration_entity as registrations, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminUserQuery, ChangeRoleRequest, DailyRegistrationRow, EventParticipationRow,
    PaginatedResponse, PaginationParams, ReportTotals, ReportsResponse, UniversityStatRow,
    UpdateProfileRequest, UserResponse, VerifyUserRequest,
};
use crate::services::NotificationService;
use crate::services::access;
use crate::utils::validate_phone;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    IntoActiveModel, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    notification_service: NotificationService,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, notification_service: NotificationService) -> Self {
        Self {
            pool,
            notification_service,
        }
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(phone) = &request.phone {
            validate_phone(phone)?;
        }

        let mut model = user.into_active_model();
        if let Some(first_name) = request.first_name {
            model.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            model.last_name = Set(last_name);
        }
        if let Some(phone) = request.phone {
            model.phone = Set(phone);
        }
        if let Some(landline) = request.landline {
            model.landline = Set(Some(landline));
        }
        if let Some(province) = request.province {
            model.province = Set(province);
        }
        if let Some(city) = request.city {
            model.city = Set(city);
        }
        if let Some(university) = request.university {
            model.university = Set(university);
        }
        if let Some(faculty) = request.faculty {
            model.faculty = Set(faculty);
        }
        if let Some(address) = request.address {
            model.address = Set(Some(address));
        }
        if let Some(student_id) = request.student_id {
            model.student_id = Set(Some(student_id));
        }
        if let Some(entrance_year) = request.entrance_year {
            model.entrance_year = Set(Some(entrance_year));
        }
        if let Some(degree) = request.degree {
            model.degree = Set(Some(degree));
        }
        if let Some(field_of_study) = request.field_of_study {
            model.field_of_study = Set(Some(field_of_study));
        }
        if let Some(academic_rank) = request.academic_rank {
            model.academic_rank = Set(Some(academic_rank));
        }
        if let Some(specialization) = request.specialization {
            model.specialization = Set(Some(specialization));
        }
        if let Some(teaching_experience) = request.teaching_experience {
            model.teaching_experience = Set(Some(teaching_experience));
        }
        if let Some(office_hours) = request.office_hours {
            model.office_hours = Set(Some(office_hours));
        }
        if let Some(website) = request.website {
            model.website = Set(Some(website));
        }
        if let Some(department) = request.department {
            model.department = Set(Some(department));
        }
        if let Some(position) = request.position {
            model.position = Set(Some(position));
        }
        if let Some(office_phone) = request.office_phone {
            model.office_phone = Set(Some(office_phone));
        }
        if let Some(responsibility) = request.responsibility {
            model.responsibility = Set(Some(responsibility));
        }

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn list_users(
        &self,
        acting_user_id: i64,
        query: &AdminUserQuery,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        access::require_admin(&self.pool, acting_user_id).await?;

        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = users::Entity::find();
        if let Some(user_type) = &query.user_type {
            base_query = base_query.filter(users::Column::UserType.eq(user_type));
        }
        if let Some(role) = &query.role {
            base_query = base_query.filter(users::Column::Role.eq(role.as_str()));
        }
        if let Some(is_verified) = query.is_verified {
            base_query = base_query.filter(users::Column::IsVerified.eq(is_verified));
        }
        if let Some(search) = &query.search {
            base_query = base_query.filter(
                Condition::any()
                    .add(users::Column::Username.contains(search))
                    .add(users::Column::Email.contains(search))
                    .add(users::Column::FirstName.contains(search))
                    .add(users::Column::LastName.contains(search)),
            );
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(users::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<UserResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, &params, total))
    }

    /// Flips a user's active flag. Admins cannot deactivate themselves.
    pub async fn toggle_active(
        &self,
        acting_user_id: i64,
        target_user_id: i64,
    ) -> AppResult<UserResponse> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        if actor.id == target_user_id {
            return Err(AppError::ValidationError(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(target_user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let new_state = !user.is_active;
        let mut model = user.into_active_model();
        model.is_active = Set(new_state);
        let updated = model.update(&self.pool).await?;

        let status = if new_state { "activated" } else { "deactivated" };
        log::info!("User {} {} by admin {}", updated.id, status, actor.id);
        self.notification_service
            .notify(
                updated.id,
                "Account status changed",
                &format!("Your account was {status}."),
            )
            .await;

        Ok(updated.into())
    }

    pub async fn change_role(
        &self,
        acting_user_id: i64,
        target_user_id: i64,
        request: ChangeRoleRequest,
    ) -> AppResult<UserResponse> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        let user = users::Entity::find_by_id(target_user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let new_role = request.role;
        let mut model = user.into_active_model();
        model.role = Set(new_role.clone());
        let updated = model.update(&self.pool).await?;

        log::info!(
            "Role of user {} changed to {} by admin {}",
            updated.id,
            new_role,
            actor.id
        );
        self.notification_service
            .notify(
                updated.id,
                "Role changed",
                &format!("Your role was changed to \"{new_role}\"."),
            )
            .await;

        Ok(updated.into())
    }

    /// Admin approval for professor/staff applications: marks the account
    /// verified, records the verifier and activates it.
    pub async fn verify_user(
        &self,
        acting_user_id: i64,
        target_user_id: i64,
        request: VerifyUserRequest,
    ) -> AppResult<UserResponse> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        let user = users::Entity::find_by_id(target_user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.is_verified {
            return Err(AppError::ValidationError(
                "User is already verified".to_string(),
            ));
        }

        let mut model = user.into_active_model();
        model.is_verified = Set(true);
        model.verified_at = Set(Some(Utc::now()));
        model.verified_by = Set(Some(actor.id));
        model.verification_notes = Set(request.notes);
        model.is_active = Set(true);
        let updated = model.update(&self.pool).await?;

        log::info!("User {} verified by admin {}", updated.id, actor.id);
        self.notification_service
            .notify(
                updated.id,
                "Account verified",
                "Your account was approved. You can now sign in.",
            )
            .await;

        Ok(updated.into())
    }

    pub async fn reports(&self, acting_user_id: i64) -> AppResult<ReportsResponse> {
        access::require_admin(&self.pool, acting_user_id).await?;

        let total_users = users::Entity::find().count(&self.pool).await? as i64;
        let pending_verifications = users::Entity::find()
            .filter(users::Column::IsVerified.eq(false))
            .count(&self.pool)
            .await? as i64;
        let total_events = events::Entity::find().count(&self.pool).await? as i64;
        let active_circles = circles::Entity::find()
            .filter(circles::Column::IsActive.eq(true))
            .count(&self.pool)
            .await? as i64;
        let total_registrations =
            registrations::Entity::find().count(&self.pool).await? as i64;

        #[derive(Debug, FromQueryResult)]
        struct ParticipationRow {
            event_id: i64,
            title: String,
            registrations: i64,
        }
        let event_participation = events::Entity::find()
            .select_only()
            .column_as(events::Column::Id, "event_id")
            .column_as(events::Column::Title, "title")
            .column_as(registrations::Column::Id.count(), "registrations")
            .join(JoinType::LeftJoin, events::Relation::Registrations.def())
            .group_by(events::Column::Id)
            .group_by(events::Column::Title)
            .order_by_desc(registrations::Column::Id.count())
            .limit(10)
            .into_model::<ParticipationRow>()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|row| EventParticipationRow {
                event_id: row.event_id,
                title: row.title,
                registrations: row.registrations,
            })
            .collect();

        #[derive(Debug, FromQueryResult)]
        struct DailyRow {
            date: String,
            count: i64,
        }
        let daily_registrations = registrations::Entity::find()
            .select_only()
            .column_as(
                Expr::cust("CAST(DATE(registration_date) AS TEXT)"),
                "date",
            )
            .column_as(registrations::Column::Id.count(), "count")
            .group_by(Expr::cust("DATE(registration_date)"))
            .order_by_desc(Expr::cust("DATE(registration_date)"))
            .limit(30)
            .into_model::<DailyRow>()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|row| DailyRegistrationRow {
                date: row.date,
                count: row.count,
            })
            .collect();

        #[derive(Debug, FromQueryResult)]
        struct UniversityRow {
            university: String,
            count: i64,
        }
        let university_stats = users::Entity::find()
            .select_only()
            .column_as(users::Column::University, "university")
            .column_as(users::Column::Id.count(), "count")
            .group_by(users::Column::University)
            .order_by_desc(users::Column::Id.count())
            .limit(10)
            .into_model::<UniversityRow>()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|row| UniversityStatRow {
                university: row.university,
                count: row.count,
            })
            .collect();

        Ok(ReportsResponse {
            totals: ReportTotals {
                total_users,
                pending_verifications,
                total_events,
                active_circles,
                total_registrations,
            },
            event_participation,
            daily_registrations,
            university_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_user, setup_test_db};

    fn service(db: &DatabaseConnection) -> UserService {
        UserService::new(db.clone(), NotificationService::new(db.clone()))
    }

    #[tokio::test]
    async fn test_toggle_active_rejects_self() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let service = service(&db);

        let result = service.toggle_active(admin.id, admin.id).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_toggle_active_flips_flag() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let user = create_test_user(&db, "student", UserRole::Participant).await;
        let service = service(&db);

        let toggled = service.toggle_active(admin.id, user.id).await.unwrap();
        assert!(!toggled.is_active);

        let toggled_back = service.toggle_active(admin.id, user.id).await.unwrap();
        assert!(toggled_back.is_active);
    }

    #[tokio::test]
    async fn test_admin_endpoints_forbidden_for_participants() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "student", UserRole::Participant).await;
        let other = create_test_user(&db, "other", UserRole::Participant).await;
        let service = service(&db);

        assert!(matches!(
            service.toggle_active(user.id, other.id).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            service.reports(user.id).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_reports_aggregate_counts() {
        use crate::services::EventService;
        use crate::test_utils::create_test_event;

        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let student = create_test_user(&db, "student", UserRole::Participant).await;
        let event = create_test_event(&db, "Workshop", Some(10), 24).await;

        let event_service =
            EventService::new(db.clone(), NotificationService::new(db.clone()));
        event_service.register(student.id, event.id).await.unwrap();

        let service = service(&db);
        let reports = service.reports(admin.id).await.unwrap();

        assert_eq!(reports.totals.total_users, 2);
        assert_eq!(reports.totals.total_events, 1);
        assert_eq!(reports.totals.total_registrations, 1);
        assert_eq!(reports.event_participation.len(), 1);
        assert_eq!(reports.event_participation[0].registrations, 1);
        assert_eq!(reports.daily_registrations.len(), 1);
        assert_eq!(reports.daily_registrations[0].count, 1);
        assert_eq!(reports.university_stats[0].count, 2);
    }

    #[tokio::test]
    async fn test_change_role_and_verify() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let mut user = create_test_user(&db, "applicant", UserRole::Participant).await;

        // put the user into the pending-verification state
        let mut model = user.clone().into_active_model();
        model.is_verified = Set(false);
        model.is_active = Set(false);
        user = model.update(&db).await.unwrap();

        let service = service(&db);

        let verified = service
            .verify_user(admin.id, user.id, VerifyUserRequest { notes: None })
            .await
            .unwrap();
        assert!(verified.is_verified);
        assert!(verified.is_active);

        let promoted = service
            .change_role(
                admin.id,
                user.id,
                ChangeRoleRequest {
                    role: UserRole::Manager,
                },
            )
            .await
            .unwrap();
        assert_eq!(promoted.role, UserRole::Manager);
    }
}
