//! Request extractors.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};
use inkwell_common::AppError;
use inkwell_core::RequestMeta;
use inkwell_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// Authenticated user with the admin role. 401 when anonymous, 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

/// Whether proxy headers may name the client address. Absent means untrusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustProxy(pub bool);

/// Client address and user agent for the activity log and view counting.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo(pub RequestMeta);

impl ClientInfo {
    /// Address used for per-IP view deduplication.
    #[must_use]
    pub fn ip_or_unknown(&self) -> &str {
        self.0.ip_address.as_deref().unwrap_or("unknown")
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let trusted = parts
            .extensions
            .get::<TrustProxy>()
            .is_some_and(|TrustProxy(trust)| *trust);
        let ip_address = if trusted {
            forwarded_ip(&parts.headers).or(peer)
        } else {
            peer
        };

        Ok(Self(RequestMeta {
            ip_address,
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }))
    }
}

/// First hop of `X-Forwarded-For`, falling back to `X-Real-IP`.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn parts_with(headers: &[(&'static str, &'static str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, HeaderValue::from_static(value));
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn behind_proxy(headers: &[(&'static str, &'static str)]) -> Parts {
        let mut parts = parts_with(headers);
        parts.extensions.insert(TrustProxy(true));
        parts
    }

    fn peer(parts: &mut Parts) {
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    }

    #[tokio::test]
    async fn test_client_info_prefers_forwarded_for() {
        let mut parts = behind_proxy(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
            ("user-agent", "curl/8.0"),
        ]);
        let ClientInfo(meta) = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[tokio::test]
    async fn test_client_info_falls_back_to_real_ip_then_peer() {
        let mut parts = behind_proxy(&[("x-real-ip", "198.51.100.2")]);
        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_or_unknown(), "198.51.100.2");

        let mut parts = behind_proxy(&[]);
        peer(&mut parts);
        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_or_unknown(), "127.0.0.1");

        let mut parts = behind_proxy(&[]);
        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_or_unknown(), "unknown");
    }

    #[tokio::test]
    async fn test_client_info_ignores_spoofed_headers_without_proxy() {
        let headers = [
            ("x-forwarded-for", "203.0.113.7"),
            ("x-real-ip", "198.51.100.2"),
        ];

        let mut parts = parts_with(&headers);
        peer(&mut parts);
        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_or_unknown(), "127.0.0.1");

        let mut parts = parts_with(&headers);
        parts.extensions.insert(TrustProxy(false));
        peer(&mut parts);
        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_or_unknown(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_auth_user_missing_is_unauthorized() {
        let mut parts = parts_with(&[]);
        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let MaybeAuthUser(user) = MaybeAuthUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
