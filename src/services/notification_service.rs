use crate::entities::{UserRole, notification_entity as notifications, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{NotificationResponse, PaginatedResponse, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, title: &str, message: &str) -> AppResult<i64> {
        let notification = notifications::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let inserted = notification.insert(&self.pool).await?;
        Ok(inserted.id)
    }

    /// Fire-and-forget delivery used as a ledger side effect. Failures are
    /// logged and never propagated into the calling operation.
    pub async fn notify(&self, user_id: i64, title: &str, message: &str) {
        if let Err(e) = self.create(user_id, title, message).await {
            log::warn!("Failed to create notification for user {user_id}: {e:?}");
        }
    }

    /// Notifies every admin account.
    pub async fn notify_admins(&self, title: &str, message: &str) {
        let admins = users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::Admin))
            .all(&self.pool)
            .await;

        match admins {
            Ok(admins) => {
                for admin in admins {
                    self.notify(admin.id, title, message).await;
                }
            }
            Err(e) => log::warn!("Failed to load admins for notification: {e:?}"),
        }
    }

    pub async fn list(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<NotificationResponse>> {
        let base_query =
            notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let data: Vec<NotificationResponse> = items.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::from_params(data, params, total))
    }

    pub async fn unread_count(&self, user_id: i64) -> AppResult<i64> {
        let count = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.pool)
            .await?;
        Ok(count as i64)
    }

    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> AppResult<()> {
        let notification = notifications::Entity::find_by_id(notification_id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        let mut model: notifications::ActiveModel = notification.into();
        model.is_read = Set(true);
        model.update(&self.pool).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: i64) -> AppResult<u64> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::{create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_notification_read_state() {
        let db = setup_test_db().await;
        let user = create_test_user(&db, "reader", UserRole::Participant).await;
        let service = NotificationService::new(db);

        let first = service.create(user.id, "Welcome", "Hello").await.unwrap();
        service.create(user.id, "Second", "Again").await.unwrap();

        assert_eq!(service.unread_count(user.id).await.unwrap(), 2);

        service.mark_read(user.id, first).await.unwrap();
        assert_eq!(service.unread_count(user.id).await.unwrap(), 1);

        let updated = service.mark_all_read(user.id).await.unwrap();
        assert_eq!(updated, 1);
        assert_eq!(service.unread_count(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_rejects_other_users_notification() {
        let db = setup_test_db().await;
        let owner = create_test_user(&db, "owner", UserRole::Participant).await;
        let other = create_test_user(&db, "other", UserRole::Participant).await;
        let service = NotificationService::new(db);

        let id = service.create(owner.id, "Private", "Only mine").await.unwrap();

        assert!(matches!(
            service.mark_read(other.id, id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
