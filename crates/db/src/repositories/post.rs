//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, PostTag, post, post_tag};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::{Expr, Func, Query},
};
use serde::Deserialize;

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Newest first
    #[default]
    Latest,
    /// Most liked first
    Popular,
    /// Most viewed first
    Views,
}

/// Filters for post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to one category
    pub category_id: Option<String>,
    pub tag_id: Option<String>,
    pub author_id: Option<String>,
    /// Case-insensitive match on title or content
    pub search: Option<String>,
    pub sort: PostSort,
    /// Include drafts and soft-deleted posts (admin listing).
    pub include_hidden: bool,
}

/// Counter columns maintained on the post row.
#[derive(Debug, Clone, Copy)]
pub enum PostCounter {
    View,
    Like,
    Comment,
    Save,
}

impl PostCounter {
    const fn column(self) -> post::Column {
        match self {
            Self::View => post::Column::ViewCount,
            Self::Like => post::Column::LikeCount,
            Self::Comment => post::Column::CommentCount,
            Self::Save => post::Column::SaveCount,
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<post::Model>> {
        Post::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tag IDs attached to a post.
    pub async fn find_tag_ids(&self, post_id: &str) -> AppResult<Vec<String>> {
        let links = PostTag::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(links.into_iter().map(|l| l.tag_id).collect())
    }

    /// Insert a post together with its tag links.
    pub async fn create_with_tags(
        &self,
        model: post::ActiveModel,
        tag_ids: &[String],
    ) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Post slug already exists"))?;

        if !tag_ids.is_empty() {
            PostTag::insert_many(tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
                post_id: Set(post.id.clone()),
                tag_id: Set(tag_id.clone()),
            }))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(post)
    }

    /// Update a post. When `tag_ids` is given the tag set is replaced.
    pub async fn update_with_tags(
        &self,
        model: post::ActiveModel,
        tag_ids: Option<&[String]>,
    ) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let post = model
            .update(&txn)
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Post slug already exists"))?;

        if let Some(tag_ids) = tag_ids {
            PostTag::delete_many()
                .filter(post_tag::Column::PostId.eq(&post.id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if !tag_ids.is_empty() {
                PostTag::insert_many(tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
                    post_id: Set(post.id.clone()),
                    tag_id: Set(tag_id.clone()),
                }))
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(post)
    }

    /// Update a post without touching its tags.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts matching `filter`, `page` is 1-based. Returns the page and the total.
    pub async fn list(
        &self,
        filter: &PostFilter,
        page: u64,
        limit: u64,
    ) -> AppResult<(Vec<post::Model>, u64)> {
        let query = Self::filtered(filter);

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let query = match filter.sort {
            PostSort::Latest => query.order_by_desc(post::Column::CreatedAt),
            PostSort::Popular => query
                .order_by_desc(post::Column::LikeCount)
                .order_by_desc(post::Column::CreatedAt),
            PostSort::Views => query
                .order_by_desc(post::Column::ViewCount)
                .order_by_desc(post::Column::CreatedAt),
        };

        let posts = query
            .order_by_desc(post::Column::Id)
            .offset(page.saturating_sub(1) * limit)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((posts, total))
    }

    fn filtered(filter: &PostFilter) -> Select<Post> {
        let mut condition = Condition::all();

        if !filter.include_hidden {
            condition = condition
                .add(post::Column::Active.eq(true))
                .add(post::Column::Status.eq(post::PostStatus::Published));
        }

        if let Some(category_id) = &filter.category_id {
            condition = condition.add(post::Column::CategoryId.eq(category_id.as_str()));
        }

        if let Some(author_id) = &filter.author_id {
            condition = condition.add(post::Column::AuthorId.eq(author_id.as_str()));
        }

        if let Some(tag_id) = &filter.tag_id {
            condition = condition.add(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTag)
                        .and_where(post_tag::Column::TagId.eq(tag_id.as_str()))
                        .to_owned(),
                ),
            );
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!(
                "%{}%",
                search
                    .to_lowercase()
                    .replace('%', "\\%")
                    .replace('_', "\\_")
            );
            condition = condition.add(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(&pattern)),
            );
        }

        Post::find().filter(condition)
    }

    /// Increment a counter atomically (single UPDATE query, no fetch).
    pub async fn increment(&self, post_id: &str, counter: PostCounter) -> AppResult<()> {
        let column = counter.column();
        Post::update_many()
            .col_expr(column, Expr::col(column).add(1))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement a counter atomically, never below zero.
    pub async fn decrement(&self, post_id: &str, counter: PostCounter) -> AppResult<()> {
        let column = counter.column();
        Post::update_many()
            .col_expr(
                column,
                Expr::cust(format!("GREATEST({} - 1, 0)", column.as_str())),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    fn create_test_post(id: &str, slug: &str, active: bool) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: "author1".to_string(),
            category_id: None,
            title: slug.to_string(),
            slug: slug.to_string(),
            excerpt: None,
            content: "body".to_string(),
            cover_image_url: None,
            status: post::PostStatus::Published,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            save_count: 0,
            active,
            published_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        match repo.get_by_id("nope").await {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "nope"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_list_returns_page_and_total() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .append_query_results([[
                    create_test_post("p2", "second", true),
                    create_test_post("p1", "first", true),
                ]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let (posts, total) = repo.list(&PostFilter::default(), 2, 10).await.unwrap();

        assert_eq!(total, 12);
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn test_public_filter_excludes_hidden_posts() {
        let sql = PostRepository::filtered(&PostFilter::default())
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""post"."active""#));
        assert!(sql.contains("published"));
    }

    #[test]
    fn test_admin_filter_includes_hidden_posts() {
        let filter = PostFilter {
            include_hidden: true,
            ..Default::default()
        };
        let sql = PostRepository::filtered(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(!sql.contains(r#""post"."active""#));
    }

    #[test]
    fn test_filter_by_tag_uses_subquery() {
        let filter = PostFilter {
            tag_id: Some("t1".to_string()),
            search: Some("Rust".to_string()),
            ..Default::default()
        };
        let sql = PostRepository::filtered(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"FROM "post_tag""#));
        assert!(sql.contains("%rust%"));
    }

    #[tokio::test]
    async fn test_create_with_tags_runs_in_transaction() {
        let post = create_test_post("p1", "hello", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let created = repo
            .create_with_tags(post.into(), &["t1".to_string(), "t2".to_string()])
            .await
            .unwrap();

        assert_eq!(created.id, "p1");
    }

    #[tokio::test]
    async fn test_decrement_is_clamped() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db.clone());
        repo.decrement("p1", PostCounter::Like).await.unwrap();
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("GREATEST(like_count - 1, 0)"));
    }
}
