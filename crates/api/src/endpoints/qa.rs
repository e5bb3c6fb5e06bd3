//! Q&A endpoints: questions, answers and votes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use inkwell_common::AppResult;
use inkwell_core::{
    AnswerDetail, CreateAnswerInput, CreateQuestionInput, Page, QuestionDetail, QuestionListQuery,
    UpdateAnswerInput, UpdateQuestionInput, VoteInput, VoteOutcome,
};
use inkwell_db::entities::{answer, question, vote::VoteTarget};

use crate::{
    extractors::{AuthUser, ClientInfo},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> AppResult<ApiResponse<Page<QuestionDetail>>> {
    Ok(ApiResponse::ok(state.question_service.list(query).await?))
}

async fn create_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<ApiResponse<QuestionDetail>> {
    let question = state.question_service.create(&user, input, &meta).await?;
    Ok(ApiResponse::created(question))
}

/// By id or slug. Counts a view.
async fn show_question(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<QuestionDetail>> {
    Ok(ApiResponse::ok(state.question_service.get(&key).await?))
}

async fn update_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateQuestionInput>,
) -> AppResult<ApiResponse<QuestionDetail>> {
    let question = state.question_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(question))
}

async fn delete_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.question_service.delete(&user, &id, &meta).await?;
    Ok(no_content())
}

async fn close_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<question::Model>> {
    Ok(ApiResponse::ok(state.question_service.close(&user, &id).await?))
}

async fn vote_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<VoteInput>,
) -> AppResult<ApiResponse<VoteOutcome>> {
    let outcome = state
        .vote_service
        .vote(&user, VoteTarget::Question, &id, input.direction)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

/// Accepted answer first, then by score.
async fn list_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<AnswerDetail>>> {
    Ok(ApiResponse::ok(state.answer_service.list(&id).await?))
}

async fn create_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Json(input): Json<CreateAnswerInput>,
) -> AppResult<ApiResponse<AnswerDetail>> {
    let answer = state.answer_service.create(&user, input, &meta).await?;
    Ok(ApiResponse::created(answer))
}

async fn update_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAnswerInput>,
) -> AppResult<ApiResponse<answer::Model>> {
    let answer = state.answer_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(answer))
}

async fn delete_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.answer_service.delete(&user, &id, &meta).await?;
    Ok(no_content())
}

async fn accept_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<answer::Model>> {
    Ok(ApiResponse::ok(state.answer_service.accept(&user, &id).await?))
}

async fn vote_answer(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<VoteInput>,
) -> AppResult<ApiResponse<VoteOutcome>> {
    let outcome = state
        .vote_service
        .vote(&user, VoteTarget::Answer, &id, input.direction)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route(
            "/questions/{key}",
            get(show_question)
                .patch(update_question)
                .delete(delete_question),
        )
        .route("/questions/{key}/close", post(close_question))
        .route("/questions/{key}/vote", post(vote_question))
        .route("/questions/{key}/answers", get(list_answers))
        .route("/answers", post(create_answer))
        .route("/answers/{id}", patch(update_answer).delete(delete_answer))
        .route("/answers/{id}/accept", post(accept_answer))
        .route("/answers/{id}/vote", post(vote_answer))
}
