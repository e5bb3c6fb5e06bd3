//! Comment repository.
//!
//! Comments are threaded through a closure table: every comment owns a
//! self row at depth 0 plus one row per ancestor. Inserting a comment, its
//! closure rows and the counter updates happen in one transaction.

use std::sync::Arc;

use crate::entities::{Comment, CommentClosure, Post, comment, comment_closure, post};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, Query},
};

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {id}")))
    }

    /// Insert a comment with its closure rows and bump the post's
    /// `comment_count` (and the parent's `reply_count` for replies).
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let comment = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let ancestors = match &comment.parent_id {
            Some(parent_id) => CommentClosure::find()
                .filter(comment_closure::Column::DescendantId.eq(parent_id))
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?,
            None => vec![],
        };

        CommentClosure::insert_many(closure_rows(&comment.id, &ancestors))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(parent_id) = &comment.parent_id {
            adjust_comment_counter(&txn, parent_id, comment::Column::ReplyCount, 1).await?;
        }
        adjust_post_comment_count(&txn, &comment.post_id, 1).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(comment)
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flag a comment as deleted and release its counters (clamped at zero).
    pub async fn soft_delete(&self, comment: comment::Model) -> AppResult<comment::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post_id = comment.post_id.clone();
        let parent_id = comment.parent_id.clone();

        let mut active: comment::ActiveModel = comment.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));
        let deleted = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(parent_id) = &parent_id {
            adjust_comment_counter(&txn, parent_id, comment::Column::ReplyCount, -1).await?;
        }
        adjust_post_comment_count(&txn, &post_id, -1).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(deleted)
    }

    /// Approved top-level comments of a post, newest first. `page` is 1-based.
    pub async fn find_top_level(
        &self,
        post_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<comment::Model>, u64)> {
        let query = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::ParentId.is_null())
            .filter(comment::Column::IsApproved.eq(true));

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let comments = query
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .offset(page.saturating_sub(1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((comments, total))
    }

    /// Every approved descendant of the given roots (roots excluded),
    /// oldest first. One query through the closure table.
    pub async fn find_descendants(&self, root_ids: &[String]) -> AppResult<Vec<comment::Model>> {
        if root_ids.is_empty() {
            return Ok(vec![]);
        }

        Comment::find()
            .filter(
                comment::Column::Id.in_subquery(
                    Query::select()
                        .column(comment_closure::Column::DescendantId)
                        .from(CommentClosure)
                        .and_where(comment_closure::Column::AncestorId.is_in(root_ids.to_vec()))
                        .and_where(comment_closure::Column::Depth.gt(0))
                        .to_owned(),
                ),
            )
            .filter(comment::Column::IsApproved.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved direct replies of a comment, oldest first.
    pub async fn find_children(&self, parent_id: &str) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentId.eq(parent_id))
            .filter(comment::Column::IsApproved.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Closure rows for a new comment: the self pair plus one row per
/// ancestor of its parent (the parent's own self row included), one level deeper.
fn closure_rows(
    comment_id: &str,
    parent_ancestors: &[comment_closure::Model],
) -> Vec<comment_closure::ActiveModel> {
    std::iter::once(comment_closure::ActiveModel {
        ancestor_id: Set(comment_id.to_string()),
        descendant_id: Set(comment_id.to_string()),
        depth: Set(0),
    })
    .chain(parent_ancestors.iter().map(|row| comment_closure::ActiveModel {
        ancestor_id: Set(row.ancestor_id.clone()),
        descendant_id: Set(comment_id.to_string()),
        depth: Set(row.depth + 1),
    }))
    .collect()
}

async fn adjust_comment_counter<C: ConnectionTrait>(
    conn: &C,
    comment_id: &str,
    column: comment::Column,
    delta: i32,
) -> AppResult<()> {
    let expr = if delta >= 0 {
        Expr::col(column).add(delta)
    } else {
        Expr::cust(format!(
            "GREATEST({} - {}, 0)",
            sea_orm::IdenStatic::as_str(&column),
            -delta
        ))
    };

    Comment::update_many()
        .col_expr(column, expr)
        .filter(comment::Column::Id.eq(comment_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}

async fn adjust_post_comment_count<C: ConnectionTrait>(
    conn: &C,
    post_id: &str,
    delta: i32,
) -> AppResult<()> {
    let expr = if delta >= 0 {
        Expr::col(post::Column::CommentCount).add(delta)
    } else {
        Expr::cust(format!("GREATEST(comment_count - {}, 0)", -delta))
    };

    Post::update_many()
        .col_expr(post::Column::CommentCount, expr)
        .filter(post::Column::Id.eq(post_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(())
}
