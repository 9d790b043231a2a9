//! Process-wide access policy (which identity strategies are permitted).
//!
//! The policy is built exactly once at startup and injected into the request
//! pipeline. Request handlers never consult ambient configuration, so a
//! misconfigured mode is unreachable at request time: the process refuses to
//! start instead.

use thiserror::Error;

/// Which identity strategies the process accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessMode {
    /// Demo headers (`x-role`, `x-company-id`) are accepted alongside tokens.
    OpenDemo,
    /// Only bearer tokens authenticate; demo headers are rejected.
    TokenOnly,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::OpenDemo => "open-demo",
            AccessMode::TokenOnly => "token-only",
        }
    }
}

/// Deployment environment, as far as access policy is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    Production,
    NonProduction,
}

impl Environment {
    /// Only the exact label `production` counts; everything else stays
    /// non-production (dev, staging, test).
    pub fn from_label(raw: &str) -> Environment {
        if raw.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::NonProduction
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("unrecognized access mode '{0}' (expected 'open-demo' or 'token-only')")]
    UnrecognizedMode(String),

    #[error("access mode must be explicitly set to 'token-only' in production")]
    ProductionRequiresTokenOnly,
}

/// Immutable process-wide access policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    environment: Environment,
    mode: AccessMode,
}

impl AccessPolicy {
    /// Validate the raw mode setting against the environment.
    ///
    /// Fails when the setting is unrecognized, and when the environment is
    /// production and the setting is absent or anything but token-only.
    /// Outside production an absent setting defaults to open-demo.
    pub fn from_settings(
        environment: Environment,
        raw_mode: Option<&str>,
    ) -> Result<Self, PolicyError> {
        let mode = match raw_mode.map(str::trim).filter(|s| !s.is_empty()) {
            None => match environment {
                Environment::Production => return Err(PolicyError::ProductionRequiresTokenOnly),
                Environment::NonProduction => AccessMode::OpenDemo,
            },
            Some(raw) => match raw.to_ascii_lowercase().replace('_', "-").as_str() {
                "open-demo" => AccessMode::OpenDemo,
                "token-only" => AccessMode::TokenOnly,
                _ => return Err(PolicyError::UnrecognizedMode(raw.to_string())),
            },
        };

        if environment == Environment::Production && mode != AccessMode::TokenOnly {
            return Err(PolicyError::ProductionRequiresTokenOnly);
        }

        Ok(Self { environment, mode })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn is_token_only(&self) -> bool {
        self.mode == AccessMode::TokenOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_production_defaults_to_open_demo() {
        let policy = AccessPolicy::from_settings(Environment::NonProduction, None).unwrap();
        assert_eq!(policy.mode(), AccessMode::OpenDemo);
        assert!(!policy.is_token_only());
    }

    #[test]
    fn mode_labels_are_normalized() {
        for raw in ["token-only", "TOKEN_ONLY", " Token-Only "] {
            let policy =
                AccessPolicy::from_settings(Environment::NonProduction, Some(raw)).unwrap();
            assert_eq!(policy.mode(), AccessMode::TokenOnly);
        }
    }

    #[test]
    fn unrecognized_mode_is_fatal() {
        let err = AccessPolicy::from_settings(Environment::NonProduction, Some("jwt")).unwrap_err();
        assert_eq!(err, PolicyError::UnrecognizedMode("jwt".to_string()));
    }

    #[test]
    fn production_requires_explicit_token_only() {
        assert_eq!(
            AccessPolicy::from_settings(Environment::Production, None).unwrap_err(),
            PolicyError::ProductionRequiresTokenOnly
        );
        assert_eq!(
            AccessPolicy::from_settings(Environment::Production, Some("open-demo")).unwrap_err(),
            PolicyError::ProductionRequiresTokenOnly
        );
        let policy =
            AccessPolicy::from_settings(Environment::Production, Some("token-only")).unwrap();
        assert!(policy.is_production() && policy.is_token_only());
    }
}
