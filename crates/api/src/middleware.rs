//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use inkwell_common::{Config, SharedStore};
use inkwell_core::{
    ActivityLogService, AnswerService, AuthService, CategoryService, CommentService,
    EmailService, GoogleOAuthClient, ListingCache, Mailer, NotificationService, PostService,
    QuestionService, TagService, TokenService, UserService, VoteService,
};
use inkwell_db::repositories::{
    ActivityLogRepository, AnswerRepository, CategoryRepository, CommentLikeRepository,
    CommentRepository, NotificationRepository, PostLikeRepository, PostRepository,
    PostViewRepository, QuestionRepository, SavedPostRepository, SessionRepository,
    TagRepository, UserRepository, VoteRepository,
};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

use crate::cookies::{ACCESS_COOKIE, CookieSettings};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub tag_service: TagService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub question_service: QuestionService,
    pub answer_service: AnswerService,
    pub vote_service: VoteService,
    pub notification_service: NotificationService,
    pub activity_service: ActivityLogService,
    pub cookies: CookieSettings,
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        store: SharedStore,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let session_repo = SessionRepository::new(Arc::clone(&db));
        let category_repo = CategoryRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let post_like_repo = PostLikeRepository::new(Arc::clone(&db));
        let saved_post_repo = SavedPostRepository::new(Arc::clone(&db));
        let post_view_repo = PostViewRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let comment_like_repo = CommentLikeRepository::new(Arc::clone(&db));
        let question_repo = QuestionRepository::new(Arc::clone(&db));
        let answer_repo = AnswerRepository::new(Arc::clone(&db));
        let vote_repo = VoteRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let activity_repo = ActivityLogRepository::new(db);

        let notification_service = NotificationService::new(notification_repo);
        let activity_service = ActivityLogService::new(activity_repo);
        let cache = ListingCache::new(
            Arc::clone(&store),
            Duration::from_secs(config.cache.listing_ttl_secs),
        );

        let tokens = TokenService::new(
            &config.auth.jwt_secret,
            config.auth.access_token_ttl_secs,
            config.auth.refresh_token_ttl_secs,
        );
        let mut auth_service = AuthService::new(
            user_repo.clone(),
            session_repo,
            tokens,
            store,
            EmailService::new(mailer, &config.server.url),
            activity_service.clone(),
            Duration::from_secs(config.auth.verification_ttl_secs),
        );
        if let Some(google) = &config.oauth.google {
            auth_service.set_google(GoogleOAuthClient::new(google.clone()));
            info!("Google sign-in enabled");
        }

        Self {
            auth_service,
            user_service: UserService::new(user_repo.clone()),
            category_service: CategoryService::new(category_repo.clone(), cache.clone()),
            tag_service: TagService::new(tag_repo.clone(), cache),
            post_service: PostService::new(
                post_repo.clone(),
                user_repo.clone(),
                category_repo,
                tag_repo,
                post_like_repo,
                saved_post_repo,
                post_view_repo,
                notification_service.clone(),
                activity_service.clone(),
            ),
            comment_service: CommentService::new(
                comment_repo,
                post_repo,
                user_repo.clone(),
                comment_like_repo,
                notification_service.clone(),
                activity_service.clone(),
            ),
            question_service: QuestionService::new(
                question_repo.clone(),
                user_repo.clone(),
                activity_service.clone(),
            ),
            answer_service: AnswerService::new(
                answer_repo.clone(),
                question_repo.clone(),
                user_repo.clone(),
                notification_service.clone(),
                activity_service.clone(),
            ),
            vote_service: VoteService::new(vote_repo, question_repo, answer_repo, user_repo),
            notification_service,
            activity_service,
            cookies: CookieSettings {
                secure: config.auth.cookie_secure,
                access_ttl_secs: config.auth.access_token_ttl_secs,
                refresh_ttl_secs: config.auth.refresh_token_ttl_secs,
            },
            trust_proxy: config.server.trust_proxy,
        }
    }
}

/// Authentication middleware.
///
/// Accepts `Authorization: Bearer <jwt>` or the `access_token` cookie. An
/// invalid token leaves the request anonymous; handlers that need a user
/// reject it with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = access_token(&req) {
        match state.auth_service.authenticate(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(error = %e, "Ignoring invalid access token"),
        }
    }

    next.run(req).await
}

fn access_token(req: &Request<Body>) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(ACCESS_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_from_header_or_cookie() {
        let req = Request::builder()
            .header("authorization", "Bearer abc")
            .header("cookie", "access_token=def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(access_token(&req).as_deref(), Some("abc"));

        let req = Request::builder()
            .header("cookie", "theme=dark; access_token=def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(access_token(&req).as_deref(), Some("def"));

        let req = Request::builder()
            .header("authorization", "Basic Zm9vOmJhcg==")
            .body(Body::empty())
            .unwrap();
        assert_eq!(access_token(&req), None);
    }
}
