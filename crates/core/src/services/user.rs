//! User service.

use chrono::Utc;
use inkwell_common::{AppError, AppResult};
use inkwell_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for updating the caller's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(url, length(max = 2048))]
    pub avatar_url: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Public profile lookup. Deactivated users only exist for admins.
    pub async fn get_by_username(
        &self,
        viewer: Option<&user::Model>,
        username: &str,
    ) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        if !user.active && !viewer.is_some_and(user::Model::is_admin) {
            return Err(AppError::UserNotFound(username.to_string()));
        }
        Ok(user)
    }

    /// Update the caller's own profile. Empty strings clear a field.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(non_empty(name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(non_empty(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(non_empty(avatar_url));
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// All users including inactive ones, newest first. `page` is 1-based.
    pub async fn list_users(&self, page: u64, limit: u64) -> AppResult<(Vec<user::Model>, u64)> {
        let limit = limit.clamp(1, 100);
        let offset = page.max(1).saturating_sub(1) * limit;
        let users = self.user_repo.list(limit, offset).await?;
        let total = self.user_repo.count().await?;
        Ok((users, total))
    }

    /// Activate or deactivate (soft delete) an account.
    pub async fn set_active(
        &self,
        admin: &user::Model,
        user_id: &str,
        active: bool,
    ) -> AppResult<user::Model> {
        if admin.id == user_id {
            return Err(AppError::BadRequest(
                "Cannot change your own account status".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = user.into();
        model.active = Set(active);
        model.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(model).await?;

        tracing::info!(admin_id = %admin.id, user_id = %user_id, active, "Changed user status");
        Ok(user)
    }

    /// Change a user's role.
    pub async fn set_role(
        &self,
        admin: &user::Model,
        user_id: &str,
        role: user::Role,
    ) -> AppResult<user::Model> {
        if admin.id == user_id {
            return Err(AppError::BadRequest("Cannot change your own role".to_string()));
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = user.into();
        model.role = Set(role);
        model.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(model).await?;

        tracing::info!(admin_id = %admin.id, user_id = %user_id, role = ?role, "Changed user role");
        Ok(user)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
