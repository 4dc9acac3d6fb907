use crate::entities::{
    CircleRole, circle_member_entity as circle_members, circle_session_entity as sessions,
    session_attendance_entity as attendances, session_file_entity as session_files,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AttendanceRateResponse, AttendanceResponse, CreateSessionRequest, MarkAttendanceRequest,
    PaginatedResponse, PaginationParams, SessionDetailResponse, SessionFileResponse, SessionQuery,
    SessionResponse, UpdateSessionRequest,
};
use crate::services::CircleService;
use crate::services::access;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Passes for the circle's active teacher or a platform admin; everyone else
/// sees `Forbidden`.
pub(crate) async fn require_circle_teacher_or_admin<C>(
    db: &C,
    circle_id: i64,
    user_id: i64,
) -> AppResult<users::Model>
where
    C: ConnectionTrait,
{
    let user = access::load_actor(db, user_id).await?;
    if user.is_admin() {
        return Ok(user);
    }

    let is_teacher = circle_members::Entity::find()
        .filter(circle_members::Column::CircleId.eq(circle_id))
        .filter(circle_members::Column::UserId.eq(user_id))
        .filter(circle_members::Column::Role.eq(CircleRole::Teacher))
        .filter(circle_members::Column::IsActive.eq(true))
        .one(db)
        .await?
        .is_some();

    if is_teacher { Ok(user) } else { Err(AppError::Forbidden) }
}

/// Attendance rate of one member: round(100 * attended / held sessions),
/// defined as 0 while the circle has held nothing.
pub(crate) async fn attendance_rate_for<C>(
    db: &C,
    member: &circle_members::Model,
) -> AppResult<i32>
where
    C: ConnectionTrait,
{
    let held = sessions::Entity::find()
        .filter(sessions::Column::CircleId.eq(member.circle_id))
        .filter(sessions::Column::IsHeld.eq(true))
        .count(db)
        .await?;

    if held == 0 {
        return Ok(0);
    }

    let attended = attendances::Entity::find()
        .filter(attendances::Column::MemberId.eq(member.id))
        .filter(attendances::Column::Attended.eq(true))
        .count(db)
        .await?;

    Ok(((attended as f64 / held as f64) * 100.0).round() as i32)
}

#[derive(Clone)]
pub struct SessionService {
    pool: DatabaseConnection,
}

impl SessionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find_session(&self, session_id: i64) -> AppResult<sessions::Model> {
        sessions::Entity::find_by_id(session_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Members and admins can browse a circle's session list.
    pub async fn list_sessions(
        &self,
        acting_user_id: i64,
        circle_id: i64,
        query: &SessionQuery,
    ) -> AppResult<PaginatedResponse<SessionResponse>> {
        let actor = access::load_actor(&self.pool, acting_user_id).await?;
        if !actor.is_admin() {
            CircleService::require_active_member(&self.pool, circle_id, acting_user_id).await?;
        }

        let params = PaginationParams::new(query.page, query.per_page);
        let today = Utc::now().date_naive();

        let mut base_query =
            sessions::Entity::find().filter(sessions::Column::CircleId.eq(circle_id));

        match query.status.as_deref() {
            Some("upcoming") => {
                base_query = base_query.filter(sessions::Column::SessionDate.gte(today));
            }
            Some("past") => {
                base_query = base_query.filter(sessions::Column::SessionDate.lt(today));
            }
            _ => {}
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(sessions::Column::SessionDate)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<SessionResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, &params, total))
    }

    /// Session detail with its attendance sheet.
    pub async fn get_session(
        &self,
        acting_user_id: i64,
        session_id: i64,
    ) -> AppResult<SessionDetailResponse> {
        let session = self.find_session(session_id).await?;

        let actor = access::load_actor(&self.pool, acting_user_id).await?;
        if !actor.is_admin() {
            CircleService::require_active_member(&self.pool, session.circle_id, acting_user_id)
                .await?;
        }

        let attendance_rows = attendances::Entity::find()
            .filter(attendances::Column::SessionId.eq(session_id))
            .order_by_asc(attendances::Column::MemberId)
            .all(&self.pool)
            .await?;

        Ok(SessionDetailResponse {
            session: session.into(),
            attendances: attendance_rows.into_iter().map(Into::into).collect(),
        })
    }

    /// Sessions are planned ahead of time by the circle teacher or an admin.
    pub async fn create_session(
        &self,
        acting_user_id: i64,
        circle_id: i64,
        request: CreateSessionRequest,
    ) -> AppResult<SessionResponse> {
        require_circle_teacher_or_admin(&self.pool, circle_id, acting_user_id).await?;

        let session = sessions::ActiveModel {
            circle_id: Set(circle_id),
            title: Set(request.title),
            session_date: Set(request.session_date),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            topic: Set(request.topic),
            description: Set(request.description),
            homework: Set(request.homework),
            is_held: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let session = session.insert(&self.pool).await?;
        log::info!(
            "Session {} created for circle {} by user {}",
            session.id,
            circle_id,
            acting_user_id
        );
        Ok(session.into())
    }

    pub async fn update_session(
        &self,
        acting_user_id: i64,
        session_id: i64,
        request: UpdateSessionRequest,
    ) -> AppResult<SessionResponse> {
        let session = self.find_session(session_id).await?;
        require_circle_teacher_or_admin(&self.pool, session.circle_id, acting_user_id).await?;

        let mut model = session.into_active_model();
        if let Some(title) = request.title {
            model.title = Set(Some(title));
        }
        if let Some(session_date) = request.session_date {
            model.session_date = Set(session_date);
        }
        if let Some(start_time) = request.start_time {
            model.start_time = Set(Some(start_time));
        }
        if let Some(end_time) = request.end_time {
            model.end_time = Set(Some(end_time));
        }
        if let Some(topic) = request.topic {
            model.topic = Set(Some(topic));
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(verses_reviewed) = request.verses_reviewed {
            model.verses_reviewed = Set(Some(verses_reviewed));
        }
        if let Some(notes) = request.notes {
            model.notes = Set(Some(notes));
        }
        if let Some(homework) = request.homework {
            model.homework = Set(Some(homework));
        }
        if let Some(is_held) = request.is_held {
            model.is_held = Set(is_held);
        }

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// Upserts the attendance fact for one member of the session's circle.
    /// Only the circle teacher or an admin may mark attendance.
    pub async fn mark_attendance(
        &self,
        acting_user_id: i64,
        session_id: i64,
        request: MarkAttendanceRequest,
    ) -> AppResult<AttendanceResponse> {
        let session = self.find_session(session_id).await?;
        let marker =
            require_circle_teacher_or_admin(&self.pool, session.circle_id, acting_user_id).await?;

        let member = circle_members::Entity::find_by_id(request.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle member not found".to_string()))?;

        if member.circle_id != session.circle_id {
            return Err(AppError::ValidationError(
                "Member does not belong to this circle".to_string(),
            ));
        }

        let late_minutes = request.late_minutes.unwrap_or(0);
        if late_minutes < 0 {
            return Err(AppError::ValidationError(
                "Late minutes cannot be negative".to_string(),
            ));
        }

        let existing = attendances::Entity::find()
            .filter(attendances::Column::SessionId.eq(session_id))
            .filter(attendances::Column::MemberId.eq(request.member_id))
            .one(&self.pool)
            .await?;

        let saved = match existing {
            Some(attendance) => {
                let mut model = attendance.into_active_model();
                model.attended = Set(request.attended);
                model.late_minutes = Set(late_minutes);
                model.excuse = Set(request.excuse);
                model.marked_by = Set(Some(marker.id));
                model.marked_at = Set(Utc::now());
                model.update(&self.pool).await?
            }
            None => {
                let attendance = attendances::ActiveModel {
                    session_id: Set(session_id),
                    member_id: Set(request.member_id),
                    attended: Set(request.attended),
                    excuse: Set(request.excuse),
                    late_minutes: Set(late_minutes),
                    marked_by: Set(Some(marker.id)),
                    marked_at: Set(Utc::now()),
                    ..Default::default()
                };
                attendance.insert(&self.pool).await?
            }
        };

        Ok(saved.into())
    }

    /// Attendance statistics for one member; visible to the member
    /// themselves, the circle teacher and admins.
    pub async fn attendance_rate(
        &self,
        acting_user_id: i64,
        member_id: i64,
    ) -> AppResult<AttendanceRateResponse> {
        let member = circle_members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Circle member not found".to_string()))?;

        if member.user_id != acting_user_id {
            require_circle_teacher_or_admin(&self.pool, member.circle_id, acting_user_id).await?;
        }

        let held = sessions::Entity::find()
            .filter(sessions::Column::CircleId.eq(member.circle_id))
            .filter(sessions::Column::IsHeld.eq(true))
            .count(&self.pool)
            .await? as i64;

        let attended = attendances::Entity::find()
            .filter(attendances::Column::MemberId.eq(member.id))
            .filter(attendances::Column::Attended.eq(true))
            .count(&self.pool)
            .await? as i64;

        let attendance_rate = attendance_rate_for(&self.pool, &member).await?;

        Ok(AttendanceRateResponse {
            member_id: member.id,
            held_sessions: held,
            attended_sessions: attended,
            attendance_rate,
        })
    }

    /// Files attached to a session, for circle members and admins.
    pub async fn list_files(
        &self,
        acting_user_id: i64,
        session_id: i64,
    ) -> AppResult<Vec<SessionFileResponse>> {
        let session = self.find_session(session_id).await?;

        let actor = access::load_actor(&self.pool, acting_user_id).await?;
        if !actor.is_admin() {
            CircleService::require_active_member(&self.pool, session.circle_id, acting_user_id)
                .await?;
        }

        let files = session_files::Entity::find()
            .filter(session_files::Column::SessionId.eq(session_id))
            .order_by_desc(session_files::Column::UploadedAt)
            .all(&self.pool)
            .await?;

        Ok(files.into_iter().map(Into::into).collect())
    }

    /// Resolves a session file for download and bumps its counter.
    pub async fn download_file(
        &self,
        acting_user_id: i64,
        file_id: i64,
    ) -> AppResult<SessionFileResponse> {
        let file = session_files::Entity::find_by_id(file_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let session = self.find_session(file.session_id).await?;

        let actor = access::load_actor(&self.pool, acting_user_id).await?;
        if !actor.is_admin() {
            CircleService::require_active_member(&self.pool, session.circle_id, acting_user_id)
                .await?;
        }

        session_files::Entity::update_many()
            .col_expr(
                session_files::Column::DownloadCount,
                Expr::col(session_files::Column::DownloadCount).add(1),
            )
            .filter(session_files::Column::Id.eq(file_id))
            .exec(&self.pool)
            .await?;

        let file = session_files::Entity::find_by_id(file_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
        Ok(file.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::{
        create_test_circle, create_test_session, create_test_user, join_as, setup_test_db,
    };

    fn service(db: &DatabaseConnection) -> SessionService {
        SessionService::new(db.clone())
    }

    #[tokio::test]
    async fn test_mark_attendance_forbidden_for_plain_member() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let member = join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        let session = create_test_session(&db, circle.id, true).await;
        let service = service(&db);

        let result = service
            .mark_attendance(
                member_user.id,
                session.id,
                MarkAttendanceRequest {
                    member_id: member.id,
                    attended: true,
                    late_minutes: None,
                    excuse: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        let rows = attendances::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_mark_attendance_upserts() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let teacher_user = create_test_user(&db, "teacher", UserRole::Participant).await;
        join_as(&db, circle.id, teacher_user.id, CircleRole::Teacher).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let member = join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        let session = create_test_session(&db, circle.id, true).await;
        let service = service(&db);

        let first = service
            .mark_attendance(
                teacher_user.id,
                session.id,
                MarkAttendanceRequest {
                    member_id: member.id,
                    attended: false,
                    late_minutes: None,
                    excuse: Some("sick".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(!first.attended);

        let second = service
            .mark_attendance(
                teacher_user.id,
                session.id,
                MarkAttendanceRequest {
                    member_id: member.id,
                    attended: true,
                    late_minutes: Some(10),
                    excuse: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert!(second.attended);
        assert_eq!(second.late_minutes, 10);
        assert_eq!(second.excuse, None);

        let rows = attendances::Entity::find().count(&db).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_mark_attendance_rejects_foreign_member() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let other_circle = create_test_circle(&db, "Tafsir", None).await;
        let admin = create_test_user(&db, "admin", UserRole::Admin).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let foreign_member = join_as(&db, other_circle.id, member_user.id, CircleRole::Member).await;
        let session = create_test_session(&db, circle.id, true).await;
        let service = service(&db);

        let result = service
            .mark_attendance(
                admin.id,
                session.id,
                MarkAttendanceRequest {
                    member_id: foreign_member.id,
                    attended: true,
                    late_minutes: None,
                    excuse: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_attendance_rate_zero_without_held_sessions() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let member = join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        // planned but not held
        create_test_session(&db, circle.id, false).await;
        let service = service(&db);

        let stats = service
            .attendance_rate(member_user.id, member.id)
            .await
            .unwrap();
        assert_eq!(stats.held_sessions, 0);
        assert_eq!(stats.attendance_rate, 0);
    }

    #[tokio::test]
    async fn test_attendance_rate_three_of_four() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let teacher_user = create_test_user(&db, "teacher", UserRole::Participant).await;
        join_as(&db, circle.id, teacher_user.id, CircleRole::Teacher).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let member = join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        let service = service(&db);

        for attended in [true, true, true, false] {
            let session = create_test_session(&db, circle.id, true).await;
            service
                .mark_attendance(
                    teacher_user.id,
                    session.id,
                    MarkAttendanceRequest {
                        member_id: member.id,
                        attended,
                        late_minutes: None,
                        excuse: None,
                    },
                )
                .await
                .unwrap();
        }

        let stats = service
            .attendance_rate(member_user.id, member.id)
            .await
            .unwrap();
        assert_eq!(stats.held_sessions, 4);
        assert_eq!(stats.attended_sessions, 3);
        assert_eq!(stats.attendance_rate, 75);
    }

    #[tokio::test]
    async fn test_attendance_rate_visibility() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        let member = join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        let stranger = create_test_user(&db, "stranger", UserRole::Participant).await;
        let service = service(&db);

        // the member can read their own rate, a stranger cannot
        assert!(service.attendance_rate(member_user.id, member.id).await.is_ok());
        assert!(matches!(
            service.attendance_rate(stranger.id, member.id).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_session_listing_requires_membership() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let member_user = create_test_user(&db, "member", UserRole::Participant).await;
        join_as(&db, circle.id, member_user.id, CircleRole::Member).await;
        let stranger = create_test_user(&db, "stranger", UserRole::Participant).await;
        create_test_session(&db, circle.id, false).await;
        let service = service(&db);

        let query = SessionQuery {
            page: None,
            per_page: None,
            status: None,
        };

        let listed = service
            .list_sessions(member_user.id, circle.id, &query)
            .await
            .unwrap();
        assert_eq!(listed.data.len(), 1);

        assert!(matches!(
            service.list_sessions(stranger.id, circle.id, &query).await,
            Err(AppError::NotAMember)
        ));
    }

    #[tokio::test]
    async fn test_teacher_creates_and_holds_session() {
        let db = setup_test_db().await;
        let circle = create_test_circle(&db, "Tajweed", None).await;
        let teacher_user = create_test_user(&db, "teacher", UserRole::Participant).await;
        join_as(&db, circle.id, teacher_user.id, CircleRole::Teacher).await;
        let service = service(&db);

        let session = service
            .create_session(
                teacher_user.id,
                circle.id,
                CreateSessionRequest {
                    title: Some("Week 1".to_string()),
                    session_date: Utc::now().date_naive(),
                    start_time: Some("08:00".to_string()),
                    end_time: Some("09:30".to_string()),
                    topic: Some("Surah Al-Fatiha".to_string()),
                    description: None,
                    homework: None,
                },
            )
            .await
            .unwrap();
        assert!(!session.is_held);

        let updated = service
            .update_session(
                teacher_user.id,
                session.id,
                UpdateSessionRequest {
                    title: None,
                    session_date: None,
                    start_time: None,
                    end_time: None,
                    topic: None,
                    description: None,
                    verses_reviewed: Some("1:1-1:7".to_string()),
                    notes: None,
                    homework: None,
                    is_held: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(updated.is_held);
    }
}
