//! Category service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator, slugify};
use inkwell_db::{entities::category, repositories::CategoryRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::listing_cache::ListingCache;

const CACHE_KEY: &str = "cache:categories";

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,

    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

/// Input for updating a category.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,

    #[validate(length(max = 1024))]
    pub description: Option<String>,

    pub active: Option<bool>,
}

/// Category service for business logic.
#[derive(Clone)]
pub struct CategoryService {
    category_repo: CategoryRepository,
    cache: ListingCache,
    id_gen: IdGenerator,
}

impl CategoryService {
    /// Create a new category service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository, cache: ListingCache) -> Self {
        Self {
            category_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Active categories, served from the cache when possible.
    pub async fn list_public(&self) -> AppResult<Vec<category::Model>> {
        if let Some(cached) = self.cache.get(CACHE_KEY).await {
            return Ok(cached);
        }

        let categories = self.category_repo.list(false).await?;
        self.cache.put(CACHE_KEY, &categories).await;
        Ok(categories)
    }

    /// Every category including inactive ones.
    pub async fn list_all(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.list(true).await
    }

    /// Active category by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<category::Model> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| AppError::NotFound(format!("Category not found: {slug}")))
    }

    /// Create a category; the slug is derived from the name.
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let name = input.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Name must contain letters or digits".to_string(),
            ));
        }

        if self
            .category_repo
            .find_conflicting(&name, &slug)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            slug: Set(slug),
            description: Set(input.description),
            active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let created = self.category_repo.create(model).await?;
        self.cache.invalidate(CACHE_KEY).await;

        tracing::debug!(category_id = %created.id, slug = %created.slug, "Created category");
        Ok(created)
    }

    /// Update a category. Renaming re-derives the slug.
    pub async fn update(&self, id: &str, input: UpdateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let category = self.category_repo.get_by_id(id).await?;
        let current_name = category.name.clone();
        let mut active: category::ActiveModel = category.into();

        if let Some(name) = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| *n != current_name)
        {
            let slug = slugify(&name);
            if slug.is_empty() {
                return Err(AppError::BadRequest(
                    "Name must contain letters or digits".to_string(),
                ));
            }
            let conflict = self.category_repo.find_conflicting(&name, &slug).await?;
            if conflict.is_some_and(|existing| existing.id != id) {
                return Err(AppError::Conflict("Category already exists".to_string()));
            }
            active.name = Set(name);
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.category_repo.update(active).await?;
        self.cache.invalidate(CACHE_KEY).await;
        Ok(updated)
    }

    /// Soft delete a category.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let category = self.category_repo.get_by_id(id).await?;
        let mut active: category::ActiveModel = category.into();
        active.active = Set(false);
        active.updated_at = Set(Some(Utc::now().into()));
        self.category_repo.update(active).await?;
        self.cache.invalidate(CACHE_KEY).await;

        tracing::debug!(category_id = %id, "Deactivated category");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_common::MemoryStore;
    use inkwell_db::test_utils::fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::{sync::Arc, time::Duration};

    fn service_with(db: MockDatabase) -> CategoryService {
        CategoryService::new(
            CategoryRepository::new(Arc::new(db.into_connection())),
            ListingCache::new(Arc::new(MemoryStore::new()), Duration::from_secs(300)),
        )
    }

    #[tokio::test]
    async fn test_list_public_is_cached() {
        // Only one query result queued: the second call must hit the cache
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::category("c1", "Rust", "rust")]]),
        );

        let first = service.list_public().await.unwrap();
        let second = service.list_public().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second[0].slug, "rust");
    }

    #[tokio::test]
    async fn test_create_invalidates_cache() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::category("c1", "Rust", "rust")]])
                .append_query_results([Vec::<category::Model>::new()])
                .append_query_results([[fixtures::category("c2", "Web Dev", "web-dev")]])
                .append_query_results([vec![
                    fixtures::category("c1", "Rust", "rust"),
                    fixtures::category("c2", "Web Dev", "web-dev"),
                ]]),
        );

        assert_eq!(service.list_public().await.unwrap().len(), 1);

        let created = service
            .create(CreateCategoryInput {
                name: "Web Dev".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "web-dev");

        assert_eq!(service.list_public().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::category("c1", "Rust", "rust")]]),
        );

        let result = service
            .create(CreateCategoryInput {
                name: "rust".to_string(),
                description: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_requires_sluggable_name() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(CreateCategoryInput {
                name: "!!!".to_string(),
                description: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_by_slug_inactive_is_not_found() {
        let inactive = category::Model {
            active: false,
            ..fixtures::category("c1", "Rust", "rust")
        };
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[inactive]]),
        );

        let result = service.get_by_slug("rust").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
