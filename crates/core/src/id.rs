//! Strongly-typed identifiers used across the domain.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a tenant (multi-tenant boundary).
///
/// A parsed `TenantId` is guaranteed to match `^[A-Za-z0-9_-]{2,64}$`, which
/// makes it safe to use directly as a directory name in tenant-scoped
/// storage. Every storage access is keyed by this value; it is the sole
/// isolation mechanism between tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    /// Parse and normalize a raw tenant identifier.
    ///
    /// Whitespace is trimmed. Empty input is `DomainError::TenantMissing`;
    /// anything that fails the pattern is `DomainError::TenantInvalid`.
    /// There is no permissive fallback: an unusable tenant id is always a
    /// rejection, never a silent default.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(DomainError::TenantMissing);
        }
        let len_ok = (Self::MIN_LEN..=Self::MAX_LEN).contains(&s.len());
        let chars_ok = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !len_ok || !chars_ok {
            return Err(DomainError::TenantInvalid);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TenantId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_safe_ids() {
        for raw in ["acme", "globex-1", "tenant_123", "AB"] {
            let id = TenantId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(TenantId::parse("  acme  ").unwrap().as_str(), "acme");
    }

    #[test]
    fn empty_is_missing() {
        assert_eq!(TenantId::parse(""), Err(DomainError::TenantMissing));
        assert_eq!(TenantId::parse("   "), Err(DomainError::TenantMissing));
    }

    #[test]
    fn pattern_violations_are_invalid() {
        for raw in ["a", "has space", "semi;colon", "a/..", "é-accent"] {
            assert_eq!(TenantId::parse(raw), Err(DomainError::TenantInvalid), "{raw}");
        }
        let too_long = "x".repeat(65);
        assert_eq!(TenantId::parse(&too_long), Err(DomainError::TenantInvalid));
    }
}
