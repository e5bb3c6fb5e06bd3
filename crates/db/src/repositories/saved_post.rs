//! Saved post repository.
//!
//! The saved row and the post's `save_count` always change in the same
//! transaction.

use std::sync::Arc;

use crate::entities::{Post, SavedPost, post, saved_post};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, sea_query::Expr,
};

/// Saved post repository for database operations.
#[derive(Clone)]
pub struct SavedPostRepository {
    db: Arc<DatabaseConnection>,
}

impl SavedPostRepository {
    /// Create a new saved post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a saved row by post and user.
    pub async fn find(&self, post_id: &str, user_id: &str) -> AppResult<Option<saved_post::Model>> {
        SavedPost::find()
            .filter(saved_post::Column::PostId.eq(post_id))
            .filter(saved_post::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has saved a post.
    pub async fn exists(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find(post_id, user_id).await?.is_some())
    }

    /// A user's saved rows, newest first (cursor-paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<saved_post::Model>> {
        let mut query = SavedPost::find()
            .filter(saved_post::Column::UserId.eq(user_id))
            .order_by_desc(saved_post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(saved_post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Save a post and bump the post's counter. A second save by the
    /// same user violates the unique index and yields `Conflict`.
    pub async fn save(&self, model: saved_post::ActiveModel) -> AppResult<saved_post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let saved = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Post already saved"))?;

        Post::update_many()
            .col_expr(
                post::Column::SaveCount,
                Expr::col(post::Column::SaveCount).add(1),
            )
            .filter(post::Column::Id.eq(&saved.post_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(saved)
    }

    /// Unsave a post and decrement the counter (clamped at zero).
    /// Returns false when there was nothing to remove.
    pub async fn unsave(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = SavedPost::delete_many()
            .filter(saved_post::Column::PostId.eq(post_id))
            .filter(saved_post::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        Post::update_many()
            .col_expr(
                post::Column::SaveCount,
                Expr::cust("GREATEST(save_count - 1, 0)"),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn create_test_saved() -> saved_post::Model {
        saved_post::Model {
            id: "l1".to_string(),
            post_id: "p1".to_string(),
            user_id: "u1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_save_inserts_and_increments() {
        let saved = create_test_saved();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[saved.clone()]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = SavedPostRepository::new(db);
        let result = repo
            .save(saved_post::ActiveModel {
                id: Set("l1".to_string()),
                post_id: Set("p1".to_string()),
                user_id: Set("u1".to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();

        assert_eq!(result.post_id, "p1");
    }

    #[tokio::test]
    async fn test_unsave_without_save_returns_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = SavedPostRepository::new(db);
        assert!(!repo.unsave("p1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_unsave_decrements() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        let repo = SavedPostRepository::new(db);
        assert!(repo.unsave("p1", "u1").await.unwrap());
    }
}
