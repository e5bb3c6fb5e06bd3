//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<session::Model>> {
        Session::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a session by the hash of its refresh token.
    pub async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<session::Model>> {
        Session::find()
            .filter(session::Column::RefreshTokenHash.eq(hash))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's sessions, most recent first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<session::Model>> {
        Session::find()
            .filter(session::Column::UserId.eq(user_id))
            .order_by_desc(session::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply `changes` to a session only while it still holds `old_hash`.
    ///
    /// Returns `false` when another request already rotated the token.
    pub async fn rotate(
        &self,
        id: &str,
        old_hash: &str,
        changes: session::ActiveModel,
    ) -> AppResult<bool> {
        let updated = Session::update_many()
            .set(changes)
            .filter(session::Column::Id.eq(id))
            .filter(session::Column::RefreshTokenHash.eq(old_hash))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(updated.rows_affected > 0)
    }

    /// Delete a session.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Session::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete every session of a user. Returns the number removed.
    pub async fn delete_by_user(&self, user_id: &str) -> AppResult<u64> {
        let result = Session::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
