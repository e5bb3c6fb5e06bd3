//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use inkwell_common::AppResult;
use inkwell_core::{CreateCategoryInput, UpdateCategoryInput};
use inkwell_db::entities::category;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Active categories (cached).
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<category::Model>>> {
    Ok(ApiResponse::ok(state.category_service.list_public().await?))
}

/// Every category, including deactivated ones.
async fn list_all(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<category::Model>>> {
    Ok(ApiResponse::ok(state.category_service.list_all().await?))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<category::Model>> {
    Ok(ApiResponse::ok(state.category_service.get_by_slug(&slug).await?))
}

async fn create(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<category::Model>> {
    Ok(ApiResponse::created(state.category_service.create(input).await?))
}

async fn update(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<ApiResponse<category::Model>> {
    Ok(ApiResponse::ok(state.category_service.update(&id, input).await?))
}

async fn remove(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.category_service.delete(&id).await?;
    Ok(no_content())
}

// GET takes a slug, PATCH and DELETE take an id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/all", get(list_all))
        .route("/{key}", get(show).patch(update).delete(remove))
}
