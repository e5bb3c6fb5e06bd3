//! Post like repository.
//!
//! The like row and the post's `like_count` always change in the same
//! transaction.

use std::sync::Arc;

use crate::entities::{Post, PostLike, post, post_like};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::Expr,
};

/// Post like repository for database operations.
#[derive(Clone)]
pub struct PostLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl PostLikeRepository {
    /// Create a new post like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by post and user.
    pub async fn find(&self, post_id: &str, user_id: &str) -> AppResult<Option<post_like::Model>> {
        PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a post.
    pub async fn exists(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        Ok(self.find(post_id, user_id).await?.is_some())
    }

    /// Insert a like and bump the post's counter. A second like by the
    /// same user violates the unique index and yields `Conflict`.
    pub async fn like(&self, model: post_like::ActiveModel) -> AppResult<post_like::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let like = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Post already liked"))?;

        Post::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::col(post::Column::LikeCount).add(1),
            )
            .filter(post::Column::Id.eq(&like.post_id))
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
    pub async fn unlike(&self, post_id: &str, user_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = PostLike::delete_many()
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(post_like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Ok(false);
        }

        Post::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::cust("GREATEST(like_count - 1, 0)"),
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
