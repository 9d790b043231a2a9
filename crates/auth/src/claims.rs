//! Access-token claims and the HS256 signer/verifier.
//!
//! Tokens are stateless: all session data lives in the signed claims. A
//! token without a tenant claim is unusable, so verification rejects it
//! outright instead of deferring to downstream checks.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject / user identifier.
    pub sub: String,

    /// Login e-mail of the subject.
    pub email: String,

    /// Role granted within the tenant.
    pub role: Role,

    /// Tenant scope of the token. Empty means the token is unusable.
    #[serde(rename = "companyId", default)]
    pub company_id: String,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiry (unix seconds).
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, expired, malformed, or otherwise unverifiable.
    #[error("invalid or expired token")]
    Invalid,

    /// Verified, but carries no tenant claim.
    #[error("token carries no tenant claim")]
    TenantMissing,
}

/// HS256 signer/verifier for access tokens.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for a subject acting in a tenant.
    pub fn sign(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        company_id: &str,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
            company_id: company_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify signature and expiry, then require a non-empty tenant claim.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;
        let claims = data.claims;
        if claims.company_id.trim().is_empty() {
            return Err(TokenError::TenantMissing);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::minutes(10))
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let token = codec()
            .sign("usr_1", "hr@acme.test", Role::Hr, "acme")
            .unwrap();
        let claims = codec().verify(&token).unwrap();
        assert_eq!(claims.sub, "usr_1");
        assert_eq!(claims.email, "hr@acme.test");
        assert_eq!(claims.role, Role::Hr);
        assert_eq!(claims.company_id, "acme");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = codec()
            .sign("usr_1", "hr@acme.test", Role::Hr, "acme")
            .unwrap();
        let other = TokenCodec::new(b"other-secret", Duration::minutes(10));
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(codec().verify("not.a.token"), Err(TokenError::Invalid));
    }

    #[test]
    fn tenantless_token_is_rejected() {
        let token = codec()
            .sign("usr_1", "hr@acme.test", Role::Hr, "")
            .unwrap();
        assert_eq!(codec().verify(&token), Err(TokenError::TenantMissing));
    }

    #[test]
    fn expired_token_is_invalid() {
        let expired = TokenCodec::new(b"test-secret", Duration::minutes(-10));
        let token = expired
            .sign("usr_1", "hr@acme.test", Role::Hr, "acme")
            .unwrap();
        assert_eq!(expired.verify(&token), Err(TokenError::Invalid));
    }
}
