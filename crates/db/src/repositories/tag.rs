//! Tag repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{PostTag, Tag, post_tag, tag};
use inkwell_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tag::Model>> {
        Tag::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tag::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }

    /// Find tags by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tag::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tag::find()
            .filter(tag::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag whose name or slug collides with the given values.
    pub async fn find_conflicting(&self, name: &str, slug: &str) -> AppResult<Option<tag::Model>> {
        Tag::find()
            .filter(
                Condition::any()
                    .add(tag::Column::Name.eq(name))
                    .add(tag::Column::Slug.eq(slug)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List tags ordered by name.
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<tag::Model>> {
        let mut query = Tag::find().order_by_asc(tag::Column::Name);

        if !include_inactive {
            query = query.filter(tag::Column::Active.eq(true));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tag.
    pub async fn create(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Tag already exists"))
    }

    /// Update a tag.
    pub async fn update(&self, model: tag::ActiveModel) -> AppResult<tag::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::from_db_message(e.to_string(), "Tag already exists"))
    }

    /// Tags attached to each of the given posts, keyed by post ID.
    pub async fn find_by_posts(
        &self,
        post_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<tag::Model>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = PostTag::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let tag_ids: Vec<String> = links.iter().map(|l| l.tag_id.clone()).collect();
        let tags: HashMap<String, tag::Model> = self
            .find_by_ids(&tag_ids)
            .await?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let mut by_post: HashMap<String, Vec<tag::Model>> = HashMap::new();
        for link in links {
            if let Some(t) = tags.get(&link.tag_id) {
                by_post.entry(link.post_id).or_default().push(t.clone());
            }
        }
        for list in by_post.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(by_post)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tag(id: &str, name: &str) -> tag::Model {
        tag::Model {
            id: id.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            active: true,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_posts_groups_tags() {
        let links = vec![
            post_tag::Model {
                post_id: "p1".to_string(),
                tag_id: "t1".to_string(),
            },
            post_tag::Model {
                post_id: "p1".to_string(),
                tag_id: "t2".to_string(),
            },
            post_tag::Model {
                post_id: "p2".to_string(),
                tag_id: "t2".to_string(),
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([links])
                .append_query_results([[create_test_tag("t1", "sql"), create_test_tag("t2", "async")]])
                .into_connection(),
        );

        let repo = TagRepository::new(db);
        let result = repo
            .find_by_posts(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();

        let p1: Vec<&str> = result["p1"].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(p1, vec!["async", "sql"]);
        assert_eq!(result["p2"].len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_posts_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = TagRepository::new(db);
        assert!(repo.find_by_posts(&[]).await.unwrap().is_empty());
    }
}
