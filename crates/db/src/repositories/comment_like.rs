//! Comment like repository.
//!
//! The like row and the comment's `like_count` always change in the same
//! transaction.

use std::sync::Arc;

use crate::entities::{Comment, CommentLike, comment, comment_like};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::Expr,
};

/// Comment like repository for database operations.
#[derive(Clone)]
pub struct CommentLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentLikeRepository {
    /// Create a new comment like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by comment and user.
    pub async fn find(&self, comment_id: &str, user_id: &str) -> AppResult<Option<comment_like::Model>> {
        CommentLike::find()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a comment.
    pub async fn exists(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find(comment_id, user_id).await?.is_some())
    }

    /// Insert a like and bump the comment's counter. A second like by the
    /// same user violates the unique index and yields `Conflict`.
    pub async fn like(&self, model: comment_like::ActiveModel) -> AppResult<comment_like::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let like = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Comment already liked"))?;

        Comment::update_many()
            .col_expr(
                comment::Column::LikeCount,
                Expr::col(comment::Column::LikeCount).add(1),
            )
            .filter(comment::Column::Id.eq(&like.comment_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(like)
    }

    /// Remove a like and decrement the counter (clamped at zero).
    /// Returns false when there was no like to remove.
    pub async fn unlike(&self, comment_id: &str, user_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = CommentLike::delete_many()
            .filter(comment_like::Column::CommentId.eq(comment_id))
            .filter(comment_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        Comment::update_many()
            .col_expr(
                comment::Column::LikeCount,
                Expr::cust("GREATEST(like_count - 1, 0)"),
            )
            .filter(comment::Column::Id.eq(comment_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }
}
