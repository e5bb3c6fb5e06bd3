//! Post view repository.

use std::sync::Arc;

use crate::entities::{Post, PostView, post, post_view};
use chrono::{DateTime, Utc};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait, sea_query::Expr,
};

/// Post view repository for database operations.
#[derive(Clone)]
pub struct PostViewRepository {
    db: Arc<DatabaseConnection>,
}

impl PostViewRepository {
    /// Create a new post view repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Whether `ip` already has a counted view of the post since `since`.
    pub async fn exists_since(
        &self,
        post_id: &str,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        let count = PostView::find()
            .filter(post_view::Column::PostId.eq(post_id))
            .filter(post_view::Column::IpAddress.eq(ip_address))
            .filter(post_view::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Record a view row and bump the post's `view_count`.
    pub async fn record(&self, model: post_view::ActiveModel) -> AppResult<post_view::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let view = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Post::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(&view.post_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(view)
    }
}
