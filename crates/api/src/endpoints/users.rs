//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use chrono::{DateTime, FixedOffset};
use inkwell_common::AppResult;
use inkwell_core::{Page, PostDetail, UpdateProfileInput, services::pagination};
use inkwell_db::entities::{activity_log, user};
use serde::{Deserialize, Serialize};

use super::{CursorQuery, PageQuery};
use crate::{
    extractors::{AdminUser, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Profile as seen by other users (no email, no auth fields).
#[derive(Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: user::Role,
    pub reputation: i32,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for PublicUser {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            bio: u.bio,
            avatar_url: u.avatar_url,
            role: u.role,
            reputation: u.reputation,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: user::Role,
}

/// All accounts, including deactivated ones.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<user::Model>>> {
    let (page, limit) = pagination::normalize(query.page, query.limit);
    let (users, total) = state.user_service.list_users(page, limit).await?;
    Ok(ApiResponse::ok(Page::new(users, total, page, limit)))
}

async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated))
}

async fn my_activity(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<activity_log::Model>>> {
    let entries = state
        .activity_service
        .list_for_user(&user.id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(entries))
}

async fn my_saved(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<PostDetail>>> {
    let posts = state
        .post_service
        .saved_posts(&user.id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// Public profile by username.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = state
        .user_service
        .get_by_username(viewer.as_ref(), &username)
        .await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn user_activity(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CursorQuery>,
) -> AppResult<ApiResponse<Vec<activity_log::Model>>> {
    let user = state.user_service.get(&id).await?;
    let entries = state
        .activity_service
        .list_for_user(&user.id, query.limit, query.until_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(entries))
}

async fn set_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.set_active(&admin, &id, req.active).await?;
    Ok(ApiResponse::ok(user))
}

async fn set_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.set_role(&admin, &id, req.role).await?;
    Ok(ApiResponse::ok(user))
}

// `{user}` is a username on GET and an id everywhere else.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me).patch(update_me))
        .route("/me/activity", get(my_activity))
        .route("/me/saved", get(my_saved))
        .route("/{user}", get(show))
        .route("/{user}/activity", get(user_activity))
        .route("/{user}/status", patch(set_status))
        .route("/{user}/role", patch(set_role))
}
