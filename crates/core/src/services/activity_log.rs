//! Activity (audit) log service.

use chrono::Utc;
use inkwell_common::{AppResult, IdGenerator};
use inkwell_db::{entities::activity_log, repositories::ActivityLogRepository};
use sea_orm::Set;
use serde_json::Value;

/// Client details attached to audited actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One audit entry to be written.
#[derive(Debug, Clone)]
pub struct ActivityEntry<'a> {
    pub user_id: Option<&'a str>,
    /// e.g. `login`, `post_create`
    pub action: &'a str,
    pub target_type: Option<&'a str>,
    pub target_id: Option<&'a str>,
    pub metadata: Value,
}

impl<'a> ActivityEntry<'a> {
    /// Entry for `action` performed by `user_id`.
    #[must_use]
    pub fn new(user_id: &'a str, action: &'a str) -> Self {
        Self {
            user_id: Some(user_id),
            action,
            target_type: None,
            target_id: None,
            metadata: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach the affected entity.
    #[must_use]
    pub const fn target(mut self, target_type: &'a str, target_id: &'a str) -> Self {
        self.target_type = Some(target_type);
        self.target_id = Some(target_id);
        self
    }

    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Activity log service.
#[derive(Clone)]
pub struct ActivityLogService {
    activity_repo: ActivityLogRepository,
    id_gen: IdGenerator,
}

impl ActivityLogService {
    /// Create a new activity log service.
    #[must_use]
    pub const fn new(activity_repo: ActivityLogRepository) -> Self {
        Self {
            activity_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Write an entry, propagating failures.
    pub async fn record(
        &self,
        entry: ActivityEntry<'_>,
        meta: &RequestMeta,
    ) -> AppResult<activity_log::Model> {
        let model = activity_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(entry.user_id.map(ToString::to_string)),
            action: Set(entry.action.to_string()),
            target_type: Set(entry.target_type.map(ToString::to_string)),
            target_id: Set(entry.target_id.map(ToString::to_string)),
            ip_address: Set(meta.ip_address.clone()),
            user_agent: Set(meta.user_agent.clone()),
            metadata: Set(entry.metadata),
            created_at: Set(Utc::now().into()),
        };

        self.activity_repo.create(model).await
    }

    /// Write an entry; failures are logged and swallowed.
    pub async fn record_quietly(&self, entry: ActivityEntry<'_>, meta: &RequestMeta) {
        let action = entry.action;
        if let Err(e) = self.record(entry, meta).await {
            tracing::warn!(error = %e, action = %action, "Failed to write activity log");
        }
    }

    /// A user's activity, newest first.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<activity_log::Model>> {
        self.activity_repo
            .find_by_user(user_id, limit.min(100), until_id)
            .await
    }
}
