use crate::entities::{
    CircleRole, circle_file_entity as circle_files, circle_member_entity as circle_members,
    quran_circle_entity as circles, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddFileRequest, CircleDetailResponse, CircleFileResponse, CircleMemberResponse, CircleQuery,
    CircleResponse, CreateCircleRequest, JoinCircleResponse, JoinStatus, PaginatedResponse,
    PaginationParams, UpdateCircleRequest,
};
use crate::services::access;
use crate::services::session_service;
use crate::services::NotificationService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};

#[derive(Clone)]
pub struct CircleService {
    pool: DatabaseConnection,
    notification_service: NotificationService,
}

impl CircleService {
    pub fn new(pool: DatabaseConnection, notification_service: NotificationService) -> Self {
        Self {
            pool,
            notification_service,
        }
    }

    pub async fn list_circles(
        &self,
        query: &CircleQuery,
    ) -> AppResult<PaginatedResponse<CircleResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query = circles::Entity::find().filter(circles::Column::IsActive.eq(true));

        if let Some(circle_type) = &query.circle_type {
            base_query = base_query.filter(circles::Column::CircleType.eq(circle_type));
        }
        if let Some(level) = &query.level {
            base_query = base_query.filter(circles::Column::Level.eq(level));
        }
        if let Some(search) = &query.search {
            base_query = base_query.filter(
                Condition::any()
                    .add(circles::Column::Name.contains(search))
                    .add(circles::Column::Description.contains(search))
                    .add(circles::Column::TeacherName.contains(search)),
            );
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(circles::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<CircleResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, &params, total))
    }

    /// Circle detail, with the requesting user's membership status when an
    /// identity was presented.
    pub async fn get_circle(
        &self,
        user_id: Option<i64>,
        circle_id: i64,
    ) -> AppResult<CircleDetailResponse> {
        let circle = circles::Entity::find_by_id(circle_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        let membership = match user_id {
            Some(user_id) => {
                circle_members::Entity::find()
                    .filter(circle_members::Column::CircleId.eq(circle_id))
                    .filter(circle_members::Column::UserId.eq(user_id))
                    .filter(circle_members::Column::IsActive.eq(true))
                    .one(&self.pool)
                    .await?
            }
            None => None,
        };

        Ok(CircleDetailResponse {
            circle: circle.into(),
            is_member: membership.is_some(),
            membership_role: membership.map(|m| m.role),
        })
    }

    pub async fn create_circle(
        &self,
        acting_user_id: i64,
        request: CreateCircleRequest,
    ) -> AppResult<CircleResponse> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        if let Some(capacity) = request.capacity
            && capacity <= 0
        {
            return Err(AppError::ValidationError(
                "Capacity must be positive".to_string(),
            ));
        }

        let circle = circles::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            teacher_name: Set(request.teacher_name),
            teacher_bio: Set(request.teacher_bio),
            circle_type: Set(request.circle_type.unwrap_or_else(|| "general".to_string())),
            level: Set(request.level.unwrap_or_else(|| "beginner".to_string())),
            days_of_week: Set(request.days_of_week),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            location: Set(request.location),
            is_online: Set(request.is_online.unwrap_or(false)),
            online_link: Set(request.online_link),
            capacity: Set(request.capacity),
            current_members: Set(0),
            is_active: Set(true),
            created_by: Set(Some(actor.id)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let circle = circle.insert(&self.pool).await?;
        log::info!("Circle {} created by user {}", circle.id, actor.id);
        Ok(circle.into())
    }

    pub async fn update_circle(
        &self,
        acting_user_id: i64,
        circle_id: i64,
        request: UpdateCircleRequest,
    ) -> AppResult<CircleResponse> {
        access::require_admin(&self.pool, acting_user_id).await?;

        let circle = circles::Entity::find_by_id(circle_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        if let Some(capacity) = request.capacity
            && capacity <= 0
        {
            return Err(AppError::ValidationError(
                "Capacity must be positive".to_string(),
            ));
        }

        let mut model = circle.into_active_model();
        if let Some(name) = request.name {
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(teacher_name) = request.teacher_name {
            model.teacher_name = Set(teacher_name);
        }
        if let Some(teacher_bio) = request.teacher_bio {
            model.teacher_bio = Set(Some(teacher_bio));
        }
        if let Some(circle_type) = request.circle_type {
            model.circle_type = Set(circle_type);
        }
        if let Some(level) = request.level {
            model.level = Set(level);
        }
        if let Some(days_of_week) = request.days_of_week {
            model.days_of_week = Set(Some(days_of_week));
        }
        if let Some(start_time) = request.start_time {
            model.start_time = Set(Some(start_time));
        }
        if let Some(end_time) = request.end_time {
            model.end_time = Set(Some(end_time));
        }
        if let Some(location) = request.location {
            model.location = Set(Some(location));
        }
        if let Some(is_online) = request.is_online {
            model.is_online = Set(is_online);
        }
        if let Some(online_link) = request.online_link {
            model.online_link = Set(Some(online_link));
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

    /// Deleting a circle drops members, sessions and files with it.
    pub async fn delete_circle(&self, acting_user_id: i64, circle_id: i64) -> AppResult<()> {
        let actor = access::require_admin(&self.pool, acting_user_id).await?;

        let circle = circles::Entity::find_by_id(circle_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        let name = circle.name.clone();
        circle.delete(&self.pool).await?;
        log::info!("Circle \"{}\" deleted by user {}", name, actor.id);
        Ok(())
    }

    /// Joins a circle, or reactivates a membership the user previously left.
    ///
    /// An already active membership is acknowledged as `AlreadyMember`
    /// without touching anything. The member counter moves with the row
    /// mutation in one transaction, and its guarded update loses the race
    /// for the last slot cleanly (`CircleFull`, full rollback).
    pub async fn join(&self, user_id: i64, circle_id: i64) -> AppResult<JoinCircleResponse> {
        let user = access::load_actor(&self.pool, user_id).await?;

        let txn = self.pool.begin().await?;

        let circle = circles::Entity::find_by_id(circle_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        if circle.is_full() {
            return Err(AppError::CircleFull);
        }

        let existing = circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle_id))
            .filter(circle_members::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        if let Some(membership) = &existing
            && membership.is_active
        {
            // Idempotent acknowledgement, nothing written.
            return Ok(JoinCircleResponse {
                status: JoinStatus::AlreadyMember,
                current_members: circle.current_members,
            });
        }

        let result = circles::Entity::update_many()
            .col_expr(
                circles::Column::CurrentMembers,
                Expr::col(circles::Column::CurrentMembers).add(1),
            )
            .filter(circles::Column::Id.eq(circle_id))
            .filter(
                Condition::any()
                    .add(circles::Column::Capacity.is_null())
                    .add(
                        Expr::col(circles::Column::CurrentMembers)
                            .lt(Expr::col(circles::Column::Capacity)),
                    ),
            )
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::CircleFull);
        }

        let status = match existing {
            Some(membership) => {
                let mut model = membership.into_active_model();
                model.is_active = Set(true);
                model.update(&txn).await?;
                JoinStatus::Rejoined
            }
            None => {
                let membership = circle_members::ActiveModel {
                    circle_id: Set(circle_id),
                    user_id: Set(user_id),
                    joined_date: Set(Utc::now()),
                    is_active: Set(true),
                    role: Set(CircleRole::Member),
                    ..Default::default()
                };
                match membership.insert(&txn).await {
                    Ok(_) => JoinStatus::Joined,
                    // A concurrent join slipped in between the read and the
                    // insert; drop our counter increment with the rollback.
                    Err(e)
                        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                    {
                        txn.rollback().await?;
                        return Ok(JoinCircleResponse {
                            status: JoinStatus::AlreadyMember,
                            current_members: circle.current_members,
                        });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        txn.commit().await?;

        log::info!("User {} joined circle {} ({:?})", user_id, circle_id, status);

        let message = match status {
            JoinStatus::Rejoined => format!("Your membership in \"{}\" is active again.", circle.name),
            _ => format!("You joined the circle \"{}\".", circle.name),
        };
        self.notification_service
            .notify(user.id, "Circle membership", &message)
            .await;

        Ok(JoinCircleResponse {
            status,
            current_members: circle.current_members + 1,
        })
    }

    /// Leaves a circle by deactivating the membership; history stays.
    pub async fn leave(&self, user_id: i64, circle_id: i64) -> AppResult<()> {
        access::load_actor(&self.pool, user_id).await?;

        let txn = self.pool.begin().await?;

        let membership = circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle_id))
            .filter(circle_members::Column::UserId.eq(user_id))
            .filter(circle_members::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or(AppError::NotAMember)?;

        let circle = circles::Entity::find_by_id(circle_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        let mut model = membership.into_active_model();
        model.is_active = Set(false);
        model.update(&txn).await?;

        circles::Entity::update_many()
            .col_expr(
                circles::Column::CurrentMembers,
                Expr::col(circles::Column::CurrentMembers).sub(1),
            )
            .filter(circles::Column::Id.eq(circle_id))
            .filter(circles::Column::CurrentMembers.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        log::info!("User {} left circle {}", user_id, circle_id);

        self.notification_service
            .notify(
                user_id,
                "Circle membership",
                &format!("You left the circle \"{}\".", circle.name),
            )
            .await;

        Ok(())
    }

    /// Member roster with attendance rates, for the circle teacher or an
    /// admin.
    pub async fn members(
        &self,
        acting_user_id: i64,
        circle_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CircleMemberResponse>> {
        session_service::require_circle_teacher_or_admin(&self.pool, circle_id, acting_user_id)
            .await?;

        let base_query = circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let rows = base_query
            .find_also_related(users::Entity)
            .order_by_asc(circle_members::Column::JoinedDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let mut data = Vec::with_capacity(rows.len());
        for (member, user) in rows {
            let Some(user) = user else { continue };
            let attendance_rate =
                session_service::attendance_rate_for(&self.pool, &member).await?;
            data.push(CircleMemberResponse {
                member_id: member.id,
                user_id: user.id,
                username: user.username.clone(),
                full_name: user.full_name(),
                role: member.role,
                is_active: member.is_active,
                joined_date: member.joined_date,
                attendance_rate,
            });
        }

        Ok(PaginatedResponse::from_params(data, params, total))
    }

    /// Circles the user currently belongs to.
    pub async fn my_circles(&self, user_id: i64) -> AppResult<Vec<CircleResponse>> {
        let rows = circle_members::Entity::find()
            .filter(circle_members::Column::UserId.eq(user_id))
            .filter(circle_members::Column::IsActive.eq(true))
            .find_also_related(circles::Entity)
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, circle)| circle.map(Into::into))
            .collect())
    }

    /// Circle files visible to the requesting member; non-public entries are
    /// reserved for the teacher and admins.
    pub async fn list_files(
        &self,
        acting_user_id: i64,
        circle_id: i64,
    ) -> AppResult<Vec<CircleFileResponse>> {
        let privileged = session_service::require_circle_teacher_or_admin(
            &self.pool,
            circle_id,
            acting_user_id,
        )
        .await
        .is_ok();

        if !privileged {
            Self::require_active_member(&self.pool, circle_id, acting_user_id).await?;
        }

        let mut query = circle_files::Entity::find()
            .filter(circle_files::Column::CircleId.eq(circle_id));
        if !privileged {
            query = query.filter(circle_files::Column::IsPublic.eq(true));
        }

        let files = query
            .order_by_desc(circle_files::Column::UploadedAt)
            .all(&self.pool)
            .await?;

        Ok(files.into_iter().map(Into::into).collect())
    }

    /// Registers metadata of an already uploaded file (teacher or admin).
    pub async fn add_file(
        &self,
        acting_user_id: i64,
        circle_id: i64,
        request: AddFileRequest,
    ) -> AppResult<CircleFileResponse> {
        let actor = session_service::require_circle_teacher_or_admin(
            &self.pool,
            circle_id,
            acting_user_id,
        )
        .await?;

        circles::Entity::find_by_id(circle_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle not found".to_string()))?;

        let file = circle_files::ActiveModel {
            circle_id: Set(circle_id),
            title: Set(request.title),
            description: Set(request.description),
            file_path: Set(request.file_path),
            file_type: Set(request.file_type),
            file_size: Set(request.file_size),
            uploaded_by: Set(Some(actor.id)),
            uploaded_at: Set(Utc::now()),
            is_public: Set(request.is_public.unwrap_or(true)),
            download_count: Set(0),
            ..Default::default()
        };

        let file = file.insert(&self.pool).await?;
        Ok(file.into())
    }

    /// Resolves a file for download and bumps its download counter.
    pub async fn download_file(
        &self,
        acting_user_id: i64,
        file_id: i64,
    ) -> AppResult<CircleFileResponse> {
        let file = circle_files::Entity::find_by_id(file_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let privileged = session_service::require_circle_teacher_or_admin(
            &self.pool,
            file.circle_id,
            acting_user_id,
        )
        .await
        .is_ok();

        if !privileged {
            Self::require_active_member(&self.pool, file.circle_id, acting_user_id).await?;
            if !file.is_public {
                return Err(AppError::Forbidden);
            }
        }

        circle_files::Entity::update_many()
            .col_expr(
                circle_files::Column::DownloadCount,
                Expr::col(circle_files::Column::DownloadCount).add(1),
            )
            .filter(circle_files::Column::Id.eq(file_id))
            .exec(&self.pool)
            .await?;

        let file = circle_files::Entity::find_by_id(file_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
        Ok(file.into())
    }

    pub(crate) async fn require_active_member<C>(
        db: &C,
        circle_id: i64,
        user_id: i64,
    ) -> AppResult<circle_members::Model>
    where
        C: ConnectionTrait,
    {
        circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle_id))
            .filter(circle_members::Column::UserId.eq(user_id))
            .filter(circle_members::Column::IsActive.eq(true))
            .one(db)
            .await?
            .ok_or(AppError::NotAMember)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::{create_test_circle, create_test_user, setup_test_db};

    fn service(db: &DatabaseConnection) -> CircleService {
        CircleService::new(db.clone(), NotificationService::new(db.clone()))
    }

    async fn current_members(db: &DatabaseConnection, circle_id: i64) -> i32 {
        circles::Entity::find_by_id(circle_id)
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .current_members
    }

    #[tokio::test]
    async fn test_join_leave_join_keeps_single_row() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "reciter", UserRole::Participant).await;
        let circle = create_test_circle(&db, "Tajweed", Some(10)).await;
        let service = service(&db);

        let joined = service.join(user.id, circle.id).await.unwrap();
        assert_eq!(joined.status, JoinStatus::Joined);

        service.leave(user.id, circle.id).await.unwrap();
        assert_eq!(current_members(&db, circle.id).await, 0);

        let rejoined = service.join(user.id, circle.id).await.unwrap();
        assert_eq!(rejoined.status, JoinStatus::Rejoined);
        assert_eq!(current_members(&db, circle.id).await, 1);

        let rows = circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle.id))
            .filter(circle_members::Column::UserId.eq(user.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_active);
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "reciter", UserRole::Participant).await;
        let circle = create_test_circle(&db, "Tajweed", Some(10)).await;
        let service = service(&db);

        service.join(user.id, circle.id).await.unwrap();
        let again = service.join(user.id, circle.id).await.unwrap();

        assert_eq!(again.status, JoinStatus::AlreadyMember);
        assert_eq!(current_members(&db, circle.id).await, 1);
    }

    #[tokio::test]
    async fn test_circle_capacity_enforced() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Small", Some(1)).await;
        let service = service(&db);

        let first = create_test_user(&db, "first", UserRole::Participant).await;
        let second = create_test_user(&db, "second", UserRole::Participant).await;

        service.join(first.id, circle.id).await.unwrap();
        let result = service.join(second.id, circle.id).await;

        assert!(matches!(result, Err(AppError::CircleFull)));
        assert_eq!(current_members(&db, circle.id).await, 1);
        let rows = circle_members::Entity::find()
            .filter(circle_members::Column::CircleId.eq(circle.id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_rejoin_respects_capacity() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Small", Some(1)).await;
        let service = service(&db);

        let first = create_test_user(&db, "first", UserRole::Participant).await;
        let second = create_test_user(&db, "second", UserRole::Participant).await;

        service.join(first.id, circle.id).await.unwrap();
        service.leave(first.id, circle.id).await.unwrap();
        service.join(second.id, circle.id).await.unwrap();

        // first's old row exists but the circle is full again
        let result = service.join(first.id, circle.id).await;
        assert!(matches!(result, Err(AppError::CircleFull)));
        assert_eq!(current_members(&db, circle.id).await, 1);
    }

    #[tokio::test]
    async fn test_leave_without_membership() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "outsider", UserRole::Participant).await;
        let circle = create_test_circle(&db, "Tajweed", Some(10)).await;
        let service = service(&db);

        let result = service.leave(user.id, circle.id).await;
        assert!(matches!(result, Err(AppError::NotAMember)));
    }

    #[tokio::test]
    async fn test_members_roster_requires_teacher_or_admin() {
        let db = setup_test_db().await;
        let member = create_test_user(&db, "member", UserRole::Participant).await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let circle = create_test_circle(&db, "Tajweed", Some(10)).await;
        let service = service(&db);

        service.join(member.id, circle.id).await.unwrap();

        let params = PaginationParams::default();
        let denied = service.members(member.id, circle.id, &params).await;
        assert!(matches!(denied, Err(AppError::Forbidden)));

        let roster = service.members(admin.id, circle.id, &params).await.unwrap();
        assert_eq!(roster.data.len(), 1);
        assert_eq!(roster.data[0].attendance_rate, 0);
    }
}
