//! Authentication service: accounts, sessions and email verification.

use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use inkwell_common::{AppError, AppResult, IdGenerator, SharedStore};
use inkwell_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::services::activity_log::{ActivityEntry, ActivityLogService, RequestMeta};
use crate::services::email::EmailService;
use crate::services::oauth::{GoogleOAuthClient, GoogleProfile, username_from_email};
use crate::services::token::{TokenPair, TokenService};

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap()
});

/// How many random suffixes to try when deriving a free username.
const USERNAME_ATTEMPTS: usize = 5;

fn verification_key(token: &str) -> String {
    format!("verify_email:{token}")
}

/// Input for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 3, max = 30), regex(path = *USERNAME_RE))]
    pub username: String,

    #[validate(email, length(max = 255))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 100))]
    pub name: Option<String>,
}

/// Input for password login. `login` is a username or an email address.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, max = 255))]
    pub login: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Input for changing the password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, max = 128))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Authenticated user plus freshly issued tokens.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: user::Model,
    pub tokens: TokenPair,
}

/// Authentication service for business logic.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    session_repo: SessionRepository,
    tokens: TokenService,
    store: SharedStore,
    email: EmailService,
    activity: ActivityLogService,
    google: Option<GoogleOAuthClient>,
    verification_ttl: Duration,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        session_repo: SessionRepository,
        tokens: TokenService,
        store: SharedStore,
        email: EmailService,
        activity: ActivityLogService,
        verification_ttl: Duration,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            tokens,
            store,
            email,
            activity,
            google: None,
            verification_ttl,
            id_gen: IdGenerator::new(),
        }
    }

    /// Enable Google login.
    pub fn set_google(&mut self, google: GoogleOAuthClient) {
        self.google = Some(google);
    }

    /// Token service used for access tokens.
    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create an account and log it in.
    pub async fn signup(&self, input: SignupInput, meta: &RequestMeta) -> AppResult<AuthSession> {
        input.validate()?;

        if self.user_repo.username_exists(&input.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.to_lowercase()),
            name: Set(input.name),
            bio: Set(None),
            avatar_url: Set(None),
            password_hash: Set(Some(password_hash)),
            google_id: Set(None),
            role: Set(user::Role::User),
            email_verified: Set(false),
            reputation: Set(0),
            active: Set(true),
            last_login_at: Set(Some(Utc::now().into())),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let user = self.user_repo.create(model).await?;

        // The user can ask for a new link later
        if let Err(e) = self.stage_verification(&user).await {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to send verification email");
        }

        let tokens = self.start_session(&user, meta).await?;
        self.activity
            .record_quietly(ActivityEntry::new(&user.id, "signup"), meta)
            .await;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(AuthSession { user, tokens })
    }

    /// Log in with username or email and password.
    pub async fn login(&self, input: LoginInput, meta: &RequestMeta) -> AppResult<AuthSession> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_login(input.login.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.active {
            return Err(AppError::Unauthorized);
        }

        let password_hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(&input.password, password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let tokens = self.start_session(&user, meta).await?;
        self.user_repo.touch_last_login(&user.id).await?;
        self.activity
            .record_quietly(ActivityEntry::new(&user.id, "login"), meta)
            .await;

        tracing::debug!(user_id = %user.id, "User logged in");
        Ok(AuthSession { user, tokens })
    }

    /// Rotate a refresh token. The session row is kept, its hash and expiry replaced.
    /// Only one of several concurrent refreshes with the same token succeeds.
    pub async fn refresh(&self, refresh_token: &str, meta: &RequestMeta) -> AppResult<AuthSession> {
        let hash = TokenService::hash_refresh_token(refresh_token);
        let session = self
            .session_repo
            .find_by_token_hash(&hash)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if session.expires_at < Utc::now() {
            self.session_repo.delete(&session.id).await?;
            return Err(AppError::Unauthorized);
        }

        let user = match self.user_repo.find_by_id(&session.user_id).await? {
            Some(user) if user.active => user,
            _ => {
                self.session_repo.delete(&session.id).await?;
                return Err(AppError::Unauthorized);
            }
        };

        let new_refresh = self.tokens.new_refresh_token();
        let now = Utc::now();
        let mut changes = session::ActiveModel {
            refresh_token_hash: Set(TokenService::hash_refresh_token(&new_refresh)),
            expires_at: Set((now + chrono::Duration::seconds(self.tokens.refresh_ttl_secs())).into()),
            last_used_at: Set(Some(now.into())),
            ..Default::default()
        };
        if meta.ip_address.is_some() {
            changes.ip_address = Set(meta.ip_address.clone());
        }
        if meta.user_agent.is_some() {
            changes.user_agent = Set(meta.user_agent.clone());
        }
        // A concurrent refresh with the same token already won the swap
        if !self.session_repo.rotate(&session.id, &hash, changes).await? {
            tracing::debug!(session_id = %session.id, "Refresh token already rotated");
            return Err(AppError::Unauthorized);
        }

        let tokens = TokenPair {
            access_token: self.tokens.issue_access(&user)?,
            refresh_token: new_refresh,
            expires_in: self.tokens.access_ttl_secs(),
        };
        Ok(AuthSession { user, tokens })
    }

    /// End the session behind a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let hash = TokenService::hash_refresh_token(refresh_token);
        if let Some(session) = self.session_repo.find_by_token_hash(&hash).await? {
            self.session_repo.delete(&session.id).await?;
            tracing::debug!(user_id = %session.user_id, session_id = %session.id, "Session ended");
        }
        Ok(())
    }

    /// Resolve an access token to an active user.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify_access(access_token)?;
        match self.user_repo.find_by_id(&claims.sub).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// Consume a verification token and mark the address verified.
    pub async fn verify_email(&self, token: &str) -> AppResult<user::Model> {
        let user_id = self
            .store
            .take(&verification_key(token))
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Invalid or expired verification token".to_string())
            })?;

        let user = self.user_repo.get_by_id(&user_id).await?;
        if user.email_verified {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.email_verified = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));
        let user = self.user_repo.update(active).await?;

        tracing::debug!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    /// Send a fresh verification link.
    pub async fn resend_verification(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if user.email_verified {
            return Err(AppError::BadRequest("Email already verified".to_string()));
        }
        self.stage_verification(&user).await
    }

    /// Change the password and end every session of the user.
    pub async fn change_password(
        &self,
        user_id: &str,
        input: ChangePasswordInput,
        meta: &RequestMeta,
    ) -> AppResult<()> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let current_hash = user.password_hash.as_deref().ok_or_else(|| {
            AppError::BadRequest("Account has no password set".to_string())
        })?;
        if !verify_password(&input.current_password, current_hash)? {
            return Err(AppError::BadRequest("Current password is incorrect".to_string()));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(Some(hash_password(&input.new_password)?));
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        let removed = self.session_repo.delete_by_user(user_id).await?;
        self.activity
            .record_quietly(ActivityEntry::new(user_id, "password_change"), meta)
            .await;

        tracing::debug!(user_id = %user_id, sessions_removed = removed, "Password changed");
        Ok(())
    }

    /// A user's sessions, most recent first.
    pub async fn list_sessions(&self, user_id: &str) -> AppResult<Vec<session::Model>> {
        self.session_repo.find_by_user(user_id).await
    }

    /// Revoke one of the user's sessions.
    pub async fn revoke_session(&self, user_id: &str, session_id: &str) -> AppResult<()> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session not found: {session_id}")))?;

        if session.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot revoke another user's session".to_string(),
            ));
        }

        self.session_repo.delete(&session.id).await
    }

    /// Google authorization URL. Fails with 400 when Google login is disabled.
    pub fn google_authorization_url(&self, state: &str) -> AppResult<String> {
        self.google_client()?.authorization_url(state)
    }

    /// Complete a Google login from the callback's authorization code.
    pub async fn oauth_login(&self, code: &str, meta: &RequestMeta) -> AppResult<AuthSession> {
        let profile = self.google_client()?.fetch_profile(code).await?;
        self.login_with_google_profile(profile, meta).await
    }

    /// Find the account for a Google profile (by Google ID, then by verified
    /// email, linking it), or create a verified one.
    pub async fn login_with_google_profile(
        &self,
        profile: GoogleProfile,
        meta: &RequestMeta,
    ) -> AppResult<AuthSession> {
        let user = if let Some(user) = self.user_repo.find_by_google_id(&profile.sub).await? {
            user
        } else if let Some(existing) = self.user_repo.find_by_email(&profile.email).await? {
            if !profile.email_verified {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            let mut active: user::ActiveModel = existing.into();
            active.google_id = Set(Some(profile.sub.clone()));
            active.email_verified = Set(true);
            active.updated_at = Set(Some(Utc::now().into()));
            let linked = self.user_repo.update(active).await?;
            tracing::info!(user_id = %linked.id, "Linked Google account");
            linked
        } else {
            let username = self.unique_username(&username_from_email(&profile.email)).await?;
            let model = user::ActiveModel {
                id: Set(self.id_gen.generate()),
                username: Set(username.clone()),
                username_lower: Set(username.to_lowercase()),
                email: Set(profile.email.to_lowercase()),
                name: Set(profile.name.clone()),
                bio: Set(None),
                avatar_url: Set(profile.picture.clone()),
                password_hash: Set(None),
                google_id: Set(Some(profile.sub.clone())),
                role: Set(user::Role::User),
                email_verified: Set(true),
                reputation: Set(0),
                active: Set(true),
                last_login_at: Set(None),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            };
            let created = self.user_repo.create(model).await?;
            tracing::info!(user_id = %created.id, username = %created.username, "User signed up with Google");
            created
        };

        if !user.active {
            return Err(AppError::Unauthorized);
        }

        let tokens = self.start_session(&user, meta).await?;
        self.user_repo.touch_last_login(&user.id).await?;
        self.activity
            .record_quietly(
                ActivityEntry::new(&user.id, "login").metadata(json!({"provider": "google"})),
                meta,
            )
            .await;

        Ok(AuthSession { user, tokens })
    }

    fn google_client(&self) -> AppResult<&GoogleOAuthClient> {
        self.google
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Google login is not configured".to_string()))
    }

    async fn unique_username(&self, base: &str) -> AppResult<String> {
        if !self.user_repo.username_exists(base).await? {
            return Ok(base.to_string());
        }
        for _ in 0..USERNAME_ATTEMPTS {
            let candidate = format!("{base}_{}", self.id_gen.generate_suffix());
            if !self.user_repo.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Conflict("Could not derive a free username".to_string()))
    }

    async fn stage_verification(&self, user: &user::Model) -> AppResult<()> {
        let token = self.id_gen.generate_token();
        self.store
            .set(&verification_key(&token), &user.id, self.verification_ttl)
            .await?;
        self.email
            .send_verification(&user.email, &user.username, &token)
            .await
    }

    async fn start_session(&self, user: &user::Model, meta: &RequestMeta) -> AppResult<TokenPair> {
        let refresh_token = self.tokens.new_refresh_token();
        let now = Utc::now();
        let model = session::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            refresh_token_hash: Set(TokenService::hash_refresh_token(&refresh_token)),
            user_agent: Set(meta.user_agent.clone()),
            ip_address: Set(meta.ip_address.clone()),
            expires_at: Set((now + chrono::Duration::seconds(self.tokens.refresh_ttl_secs())).into()),
            created_at: Set(now.into()),
            last_used_at: Set(None),
        };
        self.session_repo.create(model).await?;

        Ok(TokenPair {
            access_token: self.tokens.issue_access(user)?,
            refresh_token,
            expires_in: self.tokens.access_ttl_secs(),
        })
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
