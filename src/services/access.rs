//! Capability checks shared by all services.
//!
//! Every mutating operation loads the acting user once and goes through one
//! of these helpers, so role handling lives in a single place and callers
//! only ever see `Forbidden`.

use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use sea_orm::{ConnectionTrait, EntityTrait};

/// Loads the acting user, rejecting unknown or deactivated accounts.
pub async fn load_actor<C>(db: &C, user_id: i64) -> AppResult<users::Model>
where
    C: ConnectionTrait,
{
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))?;

    if !user.is_active {
        return Err(AppError::AuthError("Account is disabled".to_string()));
    }

    Ok(user)
}

pub async fn require_admin<C>(db: &C, user_id: i64) -> AppResult<users::Model>
where
    C: ConnectionTrait,
{
    let user = load_actor(db, user_id).await?;
    if !user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

pub async fn require_manager<C>(db: &C, user_id: i64) -> AppResult<users::Model>
where
    C: ConnectionTrait,
{
    let user = load_actor(db, user_id).await?;
    if !user.is_manager() {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
