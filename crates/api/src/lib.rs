//! HTTP API layer for inkwell.
//!
//! - **Endpoints**: REST routes for auth, users, taxonomy, posts, comments,
//!   notifications and Q&A
//! - **Extractors**: authenticated user, admin gate, client metadata
//! - **Middleware**: bearer/cookie authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod cookies;
pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Extension, Router, middleware::from_fn_with_state};
use extractors::TrustProxy;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// All routes under `/api` with authentication applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(Extension(TrustProxy(state.trust_proxy)))
        .with_state(state)
}
