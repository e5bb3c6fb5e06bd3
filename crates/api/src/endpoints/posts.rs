//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use inkwell_common::AppResult;
use inkwell_core::{CommentNode, CreatePostInput, Page, PostDetail, PostListQuery, UpdatePostInput};
use serde::Serialize;

use super::PageQuery;
use crate::{
    extractors::{AdminUser, AuthUser, ClientInfo, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

#[derive(Serialize)]
pub struct ViewResponse {
    pub counted: bool,
}

/// Published posts.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> AppResult<ApiResponse<Page<PostDetail>>> {
    Ok(ApiResponse::ok(state.post_service.list_public(query).await?))
}

/// Every post, including drafts and deleted ones.
async fn list_admin(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> AppResult<ApiResponse<Page<PostDetail>>> {
    Ok(ApiResponse::ok(state.post_service.list_admin(query).await?))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state.post_service.create(&user, input, &meta).await?;
    Ok(ApiResponse::created(post))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state
        .post_service
        .get_by_slug(viewer.as_ref(), &slug)
        .await?;
    Ok(ApiResponse::ok(post))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<ApiResponse<PostDetail>> {
    let post = state.post_service.update(&user, &id, input, &meta).await?;
    Ok(ApiResponse::ok(post))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.delete(&user, &id, &meta).await?;
    Ok(no_content())
}

/// Count a view, once per client address per day.
async fn view(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    client: ClientInfo,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ViewResponse>> {
    let counted = state
        .post_service
        .record_view(&id, viewer.as_ref().map(|u| u.id.as_str()), client.ip_or_unknown())
        .await?;
    Ok(ApiResponse::ok(ViewResponse { counted }))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.like(&user, &id).await?;
    Ok(no_content())
}

async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.unlike(&user, &id).await?;
    Ok(no_content())
}

async fn save(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.save(&user, &id).await?;
    Ok(no_content())
}

async fn unsave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.unsave(&user, &id).await?;
    Ok(no_content())
}

/// Comment tree for a post, top-level comments paginated.
async fn comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Page<CommentNode>>> {
    let page = state
        .comment_service
        .list_for_post(&id, query.page, query.limit)
        .await?;
    Ok(ApiResponse::ok(page))
}

// GET /{key} takes a slug; the other routes take the post id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/admin", get(list_admin))
        .route("/{key}", get(show).patch(update).delete(remove))
        .route("/{key}/view", post(view))
        .route("/{key}/like", post(like).delete(unlike))
        .route("/{key}/save", post(save).delete(unsave))
        .route("/{key}/comments", get(comments))
}
