//! Google OAuth 2.0 client (authorization code flow).
//!
//! Only the provider side lives here; account lookup, linking and creation
//! happen in [`crate::AuthService::oauth_login`].

use inkwell_common::{AppError, AppResult, config::OAuthClientConfig};
use serde::Deserialize;
use url::Url;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    /// Stable Google account ID
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    config: OAuthClientConfig,
    http_client: reqwest::Client,
}

impl GoogleOAuthClient {
    /// Create a client from configured credentials.
    #[must_use]
    pub fn new(config: OAuthClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// URL to redirect the browser to. `state` is echoed back on callback.
    pub fn authorization_url(&self, state: &str) -> AppResult<String> {
        let mut url = Url::parse(AUTHORIZE_ENDPOINT)
            .map_err(|e| AppError::Internal(format!("Invalid authorize endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("access_type", "online")
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Exchange an authorization code and fetch the account profile.
    pub async fn fetch_profile(&self, code: &str) -> AppResult<GoogleProfile> {
        let access_token = self.exchange_code(code).await?;

        let response = self
            .http_client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Google userinfo returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Google profile: {e}"))
        })
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google token request failed: {e}")))?;

        // A bad or reused code is the client's problem
        if response.status().is_client_error() {
            return Err(AppError::BadRequest(
                "Invalid or expired authorization code".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Google token endpoint returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Google token response: {e}"))
        })?;
        Ok(token.access_token)
    }
}

/// Username candidate for a new OAuth account: the email local part reduced
/// to `[a-z0-9_]`, between 3 and 20 characters.
#[must_use]
pub fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut name: String = local
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(20)
        .collect();

    let trimmed = name.trim_matches('_');
    name = if trimmed.is_empty() {
        "user".to_string()
    } else {
        trimmed.to_string()
    };

    while name.len() < 3 {
        name.push('_');
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_test_client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(OAuthClientConfig {
            client_id: "client-id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://blog.example.com/api/auth/google/callback".to_string(),
        })
    }

    #[test]
    fn test_authorization_url() {
        let url = create_test_client().authorization_url("xyz").unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert_eq!(pairs["client_id"], "client-id");
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(
            pairs["redirect_uri"],
            "https://blog.example.com/api/auth/google/callback"
        );
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("Jane.Doe@gmail.com"), "jane_doe");
        assert_eq!(username_from_email("ab@x.io"), "ab_");
        assert_eq!(username_from_email("...@x.io"), "user");
        assert_eq!(
            username_from_email("averyveryverylongemailaddress@x.io").len(),
            20
        );
    }

    #[test]
    fn test_profile_deserialize() {
        let profile: GoogleProfile = serde_json::from_str(
            r#"{"sub":"123","email":"a@b.c","email_verified":true,"name":"A"}"#,
        )
        .unwrap();
        assert_eq!(profile.sub, "123");
        assert!(profile.email_verified);
        assert!(profile.picture.is_none());
    }
}
