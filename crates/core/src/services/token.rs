//! Access and refresh token handling.
//!
//! Access tokens are short-lived HS256 JWTs. Refresh tokens are opaque random
//! strings; only their SHA-256 digest is persisted in the session table.

use chrono::Utc;
use inkwell_common::{AppResult, IdGenerator};
use inkwell_db::entities::user;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Role at issue time
    pub role: user::Role,
    pub exp: i64,
    pub iat: i64,
    /// Unique token ID
    pub jti: String,
}

/// Access/refresh token pair handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Issues and verifies tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    id_gen: IdGenerator,
}

impl TokenService {
    /// Create a token service from the HMAC secret and lifetimes.
    #[must_use]
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
            id_gen: IdGenerator::new(),
        }
    }

    /// Refresh token lifetime in seconds.
    #[must_use]
    pub const fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub const fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    /// Sign an access token for a user.
    pub fn issue_access(&self, user: &user::Model) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            exp: now + self.access_ttl_secs,
            iat: now,
            jti: self.id_gen.generate(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Generate a fresh opaque refresh token.
    #[must_use]
    pub fn new_refresh_token(&self) -> String {
        self.id_gen.generate_token()
    }

    /// Digest stored in place of the refresh token.
    #[must_use]
    pub fn hash_refresh_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inkwell_common::AppError;

    fn create_test_user() -> user::Model {
        user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: None,
            bio: None,
            avatar_url: None,
            password_hash: None,
            google_id: None,
            role: user::Role::Admin,
            email_verified: true,
            reputation: 0,
            active: true,
            last_login_at: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = TokenService::new("secret", 900, 3600);
        let token = service.issue_access(&create_test_user()).unwrap();

        let claims = service.verify_access(&token).unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.role, user::Role::Admin);
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.jti.len(), 26);
    }

    #[test]
    fn test_access_token_wrong_secret() {
        let issuer = TokenService::new("secret", 900, 3600);
        let verifier = TokenService::new("other", 900, 3600);
        let token = issuer.issue_access(&create_test_user()).unwrap();

        assert!(matches!(
            verifier.verify_access(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_access_token_expired() {
        // Default validation allows 60s of leeway
        let service = TokenService::new("secret", -120, 3600);
        let token = service.issue_access(&create_test_user()).unwrap();

        assert!(matches!(
            service.verify_access(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_garbage_token() {
        let service = TokenService::new("secret", 900, 3600);
        assert!(service.verify_access("not-a-jwt").is_err());
    }

    #[test]
    fn test_refresh_token_hash() {
        let service = TokenService::new("secret", 900, 3600);
        let token = service.new_refresh_token();
        let hash = TokenService::hash_refresh_token(&token);

        assert_eq!(hash.len(), 64);
        assert_ne!(hash, token);
        assert_eq!(hash, TokenService::hash_refresh_token(&token));
    }
}
