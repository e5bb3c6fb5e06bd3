//! API endpoints.

mod auth;
mod categories;
mod comments;
mod health;
mod notifications;
mod posts;
mod qa;
mod tags;
mod users;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/qa", qa::router())
}

/// Cursor pagination for feeds ordered by id (newest first).
#[derive(Debug, Default, Deserialize)]
pub struct CursorQuery {
    /// Maximum results (default: 20)
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Return rows older than this id
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Offset pagination.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
