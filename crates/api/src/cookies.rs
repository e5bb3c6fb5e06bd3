//! Auth cookies set alongside the JSON token pair.

#![allow(missing_docs)]

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use inkwell_core::TokenPair;
use time::Duration;

/// Access JWT cookie, also read by the auth middleware.
pub const ACCESS_COOKIE: &str = "access_token";
/// Opaque refresh token cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";
/// CSRF state for the Google OAuth round trip.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_TTL_SECS: i64 = 600;

/// Cookie attributes shared by every auth cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Send with the `Secure` attribute (HTTPS deployments).
    pub secure: bool,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl CookieSettings {
    fn build(&self, name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(max_age_secs))
            .build()
    }

    /// Add both token cookies to `jar`.
    #[must_use]
    pub fn with_tokens(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.build(ACCESS_COOKIE, tokens.access_token.clone(), self.access_ttl_secs))
            .add(self.build(REFRESH_COOKIE, tokens.refresh_token.clone(), self.refresh_ttl_secs))
    }

    /// Expire both token cookies.
    #[must_use]
    pub fn without_tokens(jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE).path("/"))
    }

    /// Short-lived cookie holding the OAuth `state` value.
    #[must_use]
    pub fn with_oauth_state(&self, jar: CookieJar, state: String) -> CookieJar {
        jar.add(self.build(OAUTH_STATE_COOKIE, state, OAUTH_STATE_TTL_SECS))
    }

    /// Expire the OAuth state cookie.
    #[must_use]
    pub fn without_oauth_state(jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path("/"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings() -> CookieSettings {
        CookieSettings {
            secure: true,
            access_ttl_secs: 900,
            refresh_ttl_secs: 86_400,
        }
    }

    #[test]
    fn test_with_tokens_sets_http_only_cookies() {
        let tokens = TokenPair {
            access_token: "jwt".to_string(),
            refresh_token: "opaque".to_string(),
            expires_in: 900,
        };
        let jar = settings().with_tokens(CookieJar::new(), &tokens);

        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "jwt");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.max_age(), Some(Duration::seconds(900)));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.value(), "opaque");
        assert_eq!(refresh.max_age(), Some(Duration::seconds(86_400)));
    }

    #[test]
    fn test_without_tokens_drops_cookies() {
        let tokens = TokenPair {
            access_token: "jwt".to_string(),
            refresh_token: "opaque".to_string(),
            expires_in: 900,
        };
        let jar = settings().with_tokens(CookieJar::new(), &tokens);
        let jar = CookieSettings::without_tokens(jar);
        assert!(jar.get(ACCESS_COOKIE).is_none());
        assert!(jar.get(REFRESH_COOKIE).is_none());
    }
}
