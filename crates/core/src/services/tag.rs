//! Tag service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator, slugify};
use inkwell_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::listing_cache::ListingCache;

const CACHE_KEY: &str = "cache:tags";

/// Input for creating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 1, max = 32))]
    pub name: String,
}

/// Input for updating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagInput {
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,

    pub active: Option<bool>,
}

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    cache: ListingCache,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository, cache: ListingCache) -> Self {
        Self {
            tag_repo,
            cache,
            id_gen: IdGenerator::new(),
        }
    }

    /// Active tags, served from the cache when possible.
    pub async fn list_public(&self) -> AppResult<Vec<tag::Model>> {
        if let Some(cached) = self.cache.get(CACHE_KEY).await {
            return Ok(cached);
        }

        let tags = self.tag_repo.list(false).await?;
        self.cache.put(CACHE_KEY, &tags).await;
        Ok(tags)
    }

    /// Every tag including inactive ones.
    pub async fn list_all(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.list(true).await
    }

    /// Active tag by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<tag::Model> {
        self.tag_repo
            .find_by_slug(slug)
            .await?
            .filter(|t| t.active)
            .ok_or_else(|| AppError::NotFound(format!("Tag not found: {slug}")))
    }

    /// Create a tag; the slug is derived from the name.
    pub async fn create(&self, input: CreateTagInput) -> AppResult<tag::Model> {
        input.validate()?;

        let name = input.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(
                "Name must contain letters or digits".to_string(),
            ));
        }
        if self.tag_repo.find_conflicting(&name, &slug).await?.is_some() {
            return Err(AppError::Conflict("Tag already exists".to_string()));
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            slug: Set(slug),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        };
        let created = self.tag_repo.create(model).await?;
        self.cache.invalidate(CACHE_KEY).await;

        tracing::debug!(tag_id = %created.id, slug = %created.slug, "Created tag");
        Ok(created)
    }

    /// Rename or (de)activate a tag.
    pub async fn update(&self, id: &str, input: UpdateTagInput) -> AppResult<tag::Model> {
        input.validate()?;

        let tag = self.tag_repo.get_by_id(id).await?;
        let current_name = tag.name.clone();
        let mut active: tag::ActiveModel = tag.into();

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
            let conflict = self.tag_repo.find_conflicting(&name, &slug).await?;
            if conflict.is_some_and(|existing| existing.id != id) {
                return Err(AppError::Conflict("Tag already exists".to_string()));
            }
            active.name = Set(name);
            active.slug = Set(slug);
        }
        if let Some(is_active) = input.active {
            active.active = Set(is_active);
        }

        let updated = self.tag_repo.update(active).await?;
        self.cache.invalidate(CACHE_KEY).await;
        Ok(updated)
    }

    /// Soft delete a tag.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let tag = self.tag_repo.get_by_id(id).await?;
        let mut active: tag::ActiveModel = tag.into();
        active.active = Set(false);
        self.tag_repo.update(active).await?;
        self.cache.invalidate(CACHE_KEY).await;
        Ok(())
    }
}
