//! API integration tests.
//!
//! Drive the full `/api` router over a mock database, the in-memory store
//! and the logging mailer.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, FixedOffset, Utc};
use inkwell_api::{AppState, app};
use inkwell_common::config::{
    AuthConfig, CacheConfig, Config, DatabaseConfig, OAuthConfig, RedisConfig, ServerConfig,
};
use inkwell_common::{MemoryStore, SharedStore};
use inkwell_core::{LogMailer, TokenService};
use inkwell_db::entities::{category, post, session, user};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const JWT_SECRET: &str = "integration-test-secret";

fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 4000,
            url: "http://localhost:4000".to_string(),
            cors_origins: Vec::new(),
            json_logs: false,
            trust_proxy: false,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/inkwell_test".to_string(),
            max_connections: 5,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: "redis://localhost".to_string(),
            prefix: "inkwell_test".to_string(),
            enabled: false,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 86_400,
            verification_ttl_secs: 86_400,
            cookie_secure: false,
        },
        email: None,
        oauth: OAuthConfig::default(),
        cache: CacheConfig::default(),
    }
}

fn test_app(db: DatabaseConnection) -> Router {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Arc::new(db),
        store,
        Arc::new(LogMailer::new()),
        &create_test_config(),
    );
    app(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn timestamp() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn user_model(id: &str, role: user::Role) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: format!("user_{id}"),
        username_lower: format!("user_{id}"),
        email: format!("{id}@example.com"),
        name: None,
        bio: None,
        avatar_url: None,
        password_hash: None,
        google_id: None,
        role,
        email_verified: true,
        reputation: 0,
        active: true,
        last_login_at: None,
        created_at: timestamp(),
        updated_at: None,
    }
}

fn access_token(user: &user::Model) -> String {
    TokenService::new(JWT_SECRET, 900, 86_400)
        .issue_access(user)
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app(empty_db()).oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app(empty_db())
        .oneshot(get("/api/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let response = test_app(empty_db()).oneshot(get("/api/auth/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_bearer_token() {
    let alice = user_model("u1", user::Role::User);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alice.clone()]])
        .into_connection();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", access_token(&alice)))
        .body(Body::empty())
        .unwrap();
    let response = test_app(db).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "u1");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_with_access_token_cookie() {
    let alice = user_model("u1", user::Role::User);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alice.clone()]])
        .into_connection();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, format!("access_token={}", access_token(&alice)))
        .body(Body::empty())
        .unwrap();
    let response = test_app(db).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let alice = user_model("u1", user::Role::User);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![alice.clone()]])
        .into_connection();

    let request = Request::builder()
        .uri("/api/users")
        .header(header::AUTHORIZATION, format!("Bearer {}", access_token(&alice)))
        .body(Body::empty())
        .unwrap();
    let response = test_app(db).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_signup_validation_error() {
    let body = serde_json::json!({
        "username": "al",
        "email": "not-an-email",
        "password": "short",
    });
    let response = test_app(empty_db())
        .oneshot(post_json("/api/auth/signup", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_logout_with_stale_cookies_clears_them() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<session::Model>::new()])
        .into_connection();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, "access_token=bogus; refresh_token=stale")
        .body(Body::empty())
        .unwrap();
    let response = test_app(db).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies: Vec<_> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
}

#[tokio::test]
async fn test_public_categories_are_cached() {
    let tech = category::Model {
        id: "c1".to_string(),
        name: "Tech".to_string(),
        slug: "tech".to_string(),
        description: None,
        active: true,
        created_at: timestamp(),
        updated_at: None,
    };
    // One result only: the second request must be served from the cache.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![tech]])
        .into_connection();
    let app = test_app(db);

    let response = app.clone().oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["slug"], "tech");

    let response = app.oneshot(get("/api/categories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["name"], "Tech");
}

#[tokio::test]
async fn test_create_post_requires_authentication() {
    let body = serde_json::json!({"title": "Hello", "content": "World"});
    let response = test_app(empty_db())
        .oneshot(post_json("/api/posts", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_draft_post_hidden_from_anonymous_readers() {
    let draft = post::Model {
        id: "p1".to_string(),
        author_id: "u1".to_string(),
        category_id: None,
        title: "Work in progress".to_string(),
        slug: "work-in-progress".to_string(),
        excerpt: None,
        content: "...".to_string(),
        cover_image_url: None,
        status: post::PostStatus::Draft,
        view_count: 0,
        like_count: 0,
        comment_count: 0,
        save_count: 0,
        active: true,
        published_at: None,
        created_at: timestamp(),
        updated_at: None,
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![draft]])
        .into_connection();

    let response = test_app(db)
        .oneshot(get("/api/posts/work-in-progress"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_vote_requires_authentication() {
    let body = serde_json::json!({"direction": "up"});
    let response = test_app(empty_db())
        .oneshot(post_json("/api/qa/questions/q1/vote", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
