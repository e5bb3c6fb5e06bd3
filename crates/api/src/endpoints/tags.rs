//! Tag endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use inkwell_common::AppResult;
use inkwell_core::{CreateTagInput, UpdateTagInput};
use inkwell_db::entities::tag;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Active tags (cached).
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<tag::Model>>> {
    Ok(ApiResponse::ok(state.tag_service.list_public().await?))
}

/// Every tag, including deactivated ones.
async fn list_all(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<tag::Model>>> {
    Ok(ApiResponse::ok(state.tag_service.list_all().await?))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<tag::Model>> {
    Ok(ApiResponse::ok(state.tag_service.get_by_slug(&slug).await?))
}

async fn create(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTagInput>,
) -> AppResult<ApiResponse<tag::Model>> {
    Ok(ApiResponse::created(state.tag_service.create(input).await?))
}

async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTagInput>,
) -> AppResult<ApiResponse<tag::Model>> {
    Ok(ApiResponse::ok(state.tag_service.update(&id, input).await?))
}

async fn remove(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.tag_service.delete(&id).await?;
    Ok(no_content())
}

// GET takes a slug, PATCH and DELETE take an id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/all", get(list_all))
        .route("/{key}", get(show).patch(update).delete(remove))
}
