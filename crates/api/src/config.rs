//! Process configuration with a fail-fast production contract.
//!
//! Everything is read once at startup into an immutable `AppConfig` that is
//! injected into the router; request handlers never touch the environment.
//! In production a bad deployment must be impossible: required values are
//! enforced here, before the listener binds.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use workaccess_auth::{AccessPolicy, Environment, PolicyError};

/// Development-only token secret. Never valid in production.
pub const DEV_FALLBACK_SECRET: &str = "dev-secret-change-me";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ACCESS_MODE: {0}")]
    Policy(#[from] PolicyError),

    #[error("JWT_SECRET is required in production")]
    SecretMissing,

    #[error("JWT_SECRET must not be the dev default in production")]
    SecretIsDevDefault,

    #[error("JWT_SECRET must be at least 32 characters in production")]
    SecretTooShort,

    #[error("PORT is required in production")]
    PortMissing,

    #[error("PORT must be a valid TCP port number (got '{0}')")]
    PortInvalid(String),

    #[error("CORS_ORIGINS is required in production (comma-separated origins)")]
    CorsMissing,

    #[error("CORS_ORIGINS contains invalid origin '{0}' (must start with http:// or https://)")]
    CorsInvalidOrigin(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub policy: AccessPolicy,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub port: u16,
    /// Allowed CORS origins; empty means permissive (non-production only).
    pub cors_origins: Vec<String>,
    /// Root of the tenant store.
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name→value lookup (testable without process env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = Environment::from_label(&read("APP_ENV").unwrap_or_default());
        let is_prod = environment == Environment::Production;

        let policy = AccessPolicy::from_settings(environment, read("ACCESS_MODE").as_deref())?;

        let jwt_secret = match read("JWT_SECRET") {
            Some(secret) => {
                if is_prod {
                    if secret == DEV_FALLBACK_SECRET {
                        return Err(ConfigError::SecretIsDevDefault);
                    }
                    if secret.len() < 32 {
                        return Err(ConfigError::SecretTooShort);
                    }
                }
                secret
            }
            None if is_prod => return Err(ConfigError::SecretMissing),
            None => DEV_FALLBACK_SECRET.to_string(),
        };

        let port = match read("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or(ConfigError::PortInvalid(raw))?,
            None if is_prod => return Err(ConfigError::PortMissing),
            None => DEFAULT_PORT,
        };

        let cors_origins = match read("CORS_ORIGINS") {
            Some(raw) => {
                let origins: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if origins.is_empty() && is_prod {
                    return Err(ConfigError::CorsMissing);
                }
                for origin in &origins {
                    if !origin.starts_with("http://") && !origin.starts_with("https://") {
                        return Err(ConfigError::CorsInvalidOrigin(origin.clone()));
                    }
                }
                origins
            }
            None if is_prod => return Err(ConfigError::CorsMissing),
            None => Vec::new(),
        };

        let token_ttl = read("TOKEN_TTL_HOURS")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .map(Duration::hours)
            .unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_TTL_HOURS));

        let data_dir = read("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/tenants"));

        Ok(Self {
            policy,
            jwt_secret,
            token_ttl,
            port,
            cors_origins,
            data_dir,
        })
    }
}
