//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use inkwell_common::AppResult;
use inkwell_core::{CommentNode, CreateCommentInput, UpdateCommentInput};
use inkwell_db::entities::comment;
use serde::Deserialize;

use crate::{
    extractors::{AdminUser, AuthUser, ClientInfo},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentNode>> {
    let node = state.comment_service.create(&user, input, &meta).await?;
    Ok(ApiResponse::created(node))
}

/// Edit own comment within the edit window.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state.comment_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(comment))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.delete(&user, &id, &meta).await?;
    Ok(no_content())
}

async fn replies(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentNode>>> {
    Ok(ApiResponse::ok(state.comment_service.replies(&id).await?))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.like(&user, &id).await?;
    Ok(no_content())
}

async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.comment_service.unlike(&user, &id).await?;
    Ok(no_content())
}

/// Moderation.
async fn set_approval(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> AppResult<ApiResponse<comment::Model>> {
    let comment = state
        .comment_service
        .set_approval(&admin, &id, req.approved)
        .await?;
    Ok(ApiResponse::ok(comment))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", patch(update).delete(remove))
        .route("/{id}/replies", get(replies))
        .route("/{id}/like", post(like).delete(unlike))
        .route("/{id}/approval", patch(set_approval))
}
