//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{delete, get, post},
};
use axum_extra::extract::cookie::CookieJar;
use inkwell_common::{AppError, AppResult, IdGenerator};
use inkwell_core::{AuthSession, ChangePasswordInput, LoginInput, SignupInput, TokenPair};
use inkwell_db::entities::{session, user};
use serde::{Deserialize, Serialize};

use crate::{
    cookies::{CookieSettings, OAUTH_STATE_COOKIE, REFRESH_COOKIE},
    extractors::{AuthUser, ClientInfo},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// User plus a fresh token pair.
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: user::Model,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user,
            tokens: session.tokens,
        }
    }
}

/// Refresh/logout body. The cookie is used when the body omits the token.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Email verification body.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Google redirect query.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn refresh_token_from(jar: &CookieJar, body: Option<Json<RefreshRequest>>) -> Option<String> {
    body.and_then(|Json(req)| req.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .filter(|t| !t.is_empty())
}

/// Create an account and sign in.
async fn signup(
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    jar: CookieJar,
    Json(input): Json<SignupInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let session = state.auth_service.signup(input, &meta).await?;
    let jar = state.cookies.with_tokens(jar, &session.tokens);
    Ok((jar, ApiResponse::created(session.into())))
}

/// Sign in with username or email.
async fn login(
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let session = state.auth_service.login(input, &meta).await?;
    let jar = state.cookies.with_tokens(jar, &session.tokens);
    Ok((jar, ApiResponse::ok(session.into())))
}

/// Rotate the refresh token.
async fn refresh(
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    let token = refresh_token_from(&jar, body).ok_or(AppError::Unauthorized)?;
    let session = state.auth_service.refresh(&token, &meta).await?;
    let jar = state.cookies.with_tokens(jar, &session.tokens);
    Ok((jar, ApiResponse::ok(session.into())))
}

/// End the current session.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, StatusCode)> {
    if let Some(token) = refresh_token_from(&jar, body) {
        state.auth_service.logout(&token).await?;
    }
    Ok((CookieSettings::without_tokens(jar), no_content()))
}

/// Current user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}

/// Consume an emailed verification token.
async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.auth_service.verify_email(&req.token).await?;
    Ok(ApiResponse::ok(user))
}

async fn resend_verification(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.auth_service.resend_verification(&user.id).await?;
    Ok(no_content())
}

/// Change password. All sessions are revoked, so the cookies go too.
async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    jar: CookieJar,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<(CookieJar, StatusCode)> {
    state
        .auth_service
        .change_password(&user.id, input, &meta)
        .await?;
    Ok((CookieSettings::without_tokens(jar), no_content()))
}

async fn list_sessions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<session::Model>>> {
    let sessions = state.auth_service.list_sessions(&user.id).await?;
    Ok(ApiResponse::ok(sessions))
}

async fn revoke_session(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.auth_service.revoke_session(&user.id, &id).await?;
    Ok(no_content())
}

/// Start the Google sign-in redirect.
async fn google(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    let oauth_state = IdGenerator::new().generate_token();
    let url = state.auth_service.google_authorization_url(&oauth_state)?;
    let jar = state.cookies.with_oauth_state(jar, oauth_state);
    Ok((jar, Redirect::to(&url)))
}

/// Google redirect target.
async fn google_callback(
    State(state): State<AppState>,
    ClientInfo(meta): ClientInfo,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> AppResult<(CookieJar, ApiResponse<AuthResponse>)> {
    if let Some(error) = query.error {
        return Err(AppError::BadRequest(format!("Google sign-in failed: {error}")));
    }

    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    if expected.is_none() || expected != query.state {
        return Err(AppError::BadRequest("OAuth state mismatch".to_string()));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let session = state.auth_service.oauth_login(&code, &meta).await?;
    let jar = CookieSettings::without_oauth_state(jar);
    let jar = state.cookies.with_tokens(jar, &session.tokens);
    Ok((jar, ApiResponse::ok(session.into())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/verify-email", post(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/change-password", post(change_password))
        .route("/sessions", get(list_sessions))
        .route("/sessions/{id}", delete(revoke_session))
        .route("/google", get(google))
        .route("/google/callback", get(google_callback))
}
