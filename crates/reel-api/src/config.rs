//! API configuration.

use std::fmt;

use thiserror::Error;

/// Default allowed browser origins.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "https://reel-farm-clone-frontend.vercel.app",
];

/// Missing or malformed configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Reverse proxies in front of the API that append to `X-Forwarded-For`
    pub trusted_proxy_hops: usize,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Postgres connection string
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    pub billing: BillingConfig,
    pub llm: LlmConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            rate_limit_rps: 10,
            trusted_proxy_hops: 0,
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            database_url: "postgres://localhost/reel_farm".to_string(),
            db_max_connections: 10,
            auth: AuthConfig::default(),
            billing: BillingConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            trusted_proxy_hops: std::env::var("TRUSTED_PROXY_HOPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.trusted_proxy_hops),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            auth: AuthConfig::from_env(),
            billing: BillingConfig::from_env(),
            llm: LlmConfig::from_env(),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Bearer token verification settings.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// HS256 secret. Required unless auth is disabled.
    pub jwt_secret: Option<String>,
    /// Development mode: every request acts as the fixed dev user.
    pub disabled: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            disabled: std::env::var("AUTH_DISABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Stripe credentials and endpoint.
#[derive(Clone)]
pub struct BillingConfig {
    pub secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            webhook_secret: None,
            api_base: "https://api.stripe.com".to_string(),
        }
    }
}

impl BillingConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY").ok().filter(|s| !s.is_empty()),
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
        }
    }
}

impl fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Chat completion provider settings.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-5-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            api_base: std::env::var("OPENAI_API_BASE").unwrap_or(defaults.api_base),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.cors_origins.len(), 3);
        assert!(!config.is_production());
        assert_eq!(config.llm.model, "gpt-5-mini");
        assert_eq!(config.billing.api_base, "https://api.stripe.com");
        assert_eq!(config.trusted_proxy_hops, 0);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let auth = AuthConfig {
            jwt_secret: Some("super-secret".to_string()),
            disabled: false,
        };
        let billing = BillingConfig {
            secret_key: Some("sk_live_123".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
        assert!(!format!("{:?}", billing).contains("sk_live_123"));
    }

    #[test]
    fn test_production_check_ignores_case() {
        let config = ApiConfig {
            environment: "Production".to_string(),
            ..Default::default()
        };
        assert!(config.is_production());
    }
}
