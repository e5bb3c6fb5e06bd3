//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Outgoing mail configuration (mail is logged when absent).
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// OAuth provider configuration.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the frontend (used in mail links and OAuth redirects).
    pub url: String,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json_logs: bool,
    /// Take the client address from `X-Forwarded-For`/`X-Real-IP`.
    /// Enable only behind a reverse proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
    /// When false an in-process store is used instead (single instance only).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    /// Refresh token (session) lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,
    /// Email verification token lifetime in seconds.
    #[serde(default = "default_verification_ttl")]
    pub verification_ttl_secs: u64,
    /// Mark auth cookies `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub password: Option<String>,
    /// From address, e.g. `Inkwell <no-reply@example.com>`.
    pub from: String,
}

/// OAuth providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    /// Google OAuth client.
    #[serde(default)]
    pub google: Option<OAuthClientConfig>,
}

/// OAuth client credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientConfig {
    /// Client ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Redirect URI registered with the provider.
    pub redirect_uri: String,
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached public listings (categories, tags) in seconds.
    #[serde(default = "default_cache_ttl")]
    pub listing_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            listing_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    4000
}

const fn default_max_connections() -> u32 {
    50
}

const fn default_min_connections() -> u32 {
    5
}

fn default_redis_prefix() -> String {
    "inkwell".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_access_ttl() -> i64 {
    15 * 60
}

const fn default_refresh_ttl() -> i64 {
    30 * 24 * 60 * 60
}

const fn default_verification_ttl() -> u64 {
    24 * 60 * 60
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_cache_ttl() -> u64 {
    300
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `INKWELL_ENV`)
    /// 4. Environment variables with `INKWELL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("INKWELL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("INKWELL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("INKWELL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let raw = r#"
            [server]
            url = "http://localhost:3000"

            [database]
            url = "postgres://localhost/inkwell"

            [redis]
            url = "redis://localhost"

            [auth]
            jwt_secret = "secret"
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 4000);
        assert!(!config.server.trust_proxy);
        assert_eq!(config.auth.access_token_ttl_secs, 900);
        assert_eq!(config.cache.listing_ttl_secs, 300);
        assert!(config.redis.enabled);
        assert!(config.email.is_none());
        assert!(config.oauth.google.is_none());
    }
}
