//! The request authorization pipeline as pure, ordered decision steps.
//!
//! The ordering here is load-bearing: the public exemption is checked before
//! any credential requirement so login itself stays reachable, and a
//! presented bearer credential always takes precedence over demo headers so
//! a client cannot change its privilege by omitting a header. Keeping the
//! steps as plain functions makes those invariants unit-testable without any
//! transport in the way.

use axum::http::{HeaderMap, Method};

use workaccess_auth::{AccessPolicy, AuthContext, Role, TokenCodec, TokenError};
use workaccess_core::TenantId;

use crate::error::{ApiError, AuthCode};

/// Everything the gates need from a request (transport-agnostic).
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub demo_role: Option<String>,
    pub demo_company_id: Option<String>,
}

impl RequestMeta {
    pub fn from_parts(method: &Method, path: &str, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };
        Self {
            method: method.clone(),
            path: path.to_string(),
            authorization: header("authorization"),
            demo_role: header("x-role"),
            demo_company_id: header("x-company-id"),
        }
    }
}

/// Routes reachable without any credential, in every access mode.
pub fn is_public(method: &Method, path: &str) -> bool {
    (*method == Method::GET && path == "/health")
        || (*method == Method::POST && path == "/public/register-company")
        || (*method == Method::POST && path == "/auth/login")
}

/// Routes the subscription/trial gate must never block: health, public
/// registration, auth, the read-only profile lookup, and billing management
/// itself (activation must stay reachable when locked).
pub fn is_billing_exempt(method: &Method, path: &str) -> bool {
    if path == "/health"
        || path.starts_with("/public")
        || path.starts_with("/auth")
        || path.starts_with("/billing")
    {
        return true;
    }
    *method == Method::GET && (path == "/company" || path.starts_with("/company/"))
}

/// Steps 1–2: produce a verified identity or reject.
pub fn resolve_identity(
    policy: &AccessPolicy,
    codec: &TokenCodec,
    meta: &RequestMeta,
) -> Result<AuthContext, ApiError> {
    if is_public(&meta.method, &meta.path) {
        return Ok(AuthContext::anonymous());
    }

    if let Some(raw) = meta.authorization.as_deref() {
        // A malformed Authorization header is a rejected credential, never a
        // silent fallback to demo headers.
        let token = raw
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized(AuthCode::TokenInvalid))?;

        let claims = codec.verify(token).map_err(|e| match e {
            TokenError::TenantMissing => ApiError::Unauthorized(AuthCode::TokenTenantMissing),
            TokenError::Invalid => ApiError::Unauthorized(AuthCode::TokenInvalid),
        })?;

        return Ok(AuthContext {
            role: claims.role,
            user_id: Some(claims.sub),
            company_id: Some(claims.company_id),
        });
    }

    if policy.is_production() {
        return Err(ApiError::Unauthorized(AuthCode::JwtRequired));
    }
    if policy.is_token_only() {
        return Err(ApiError::Unauthorized(AuthCode::JwtOnly));
    }

    // Demo mode: role and tenant come straight from headers. Tenant
    // enforcement happens next; role degradation is handled by the closed
    // role set.
    let role = Role::from_label(meta.demo_role.as_deref().unwrap_or(""));
    let company_id = meta
        .demo_company_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Ok(AuthContext {
        role,
        user_id: None,
        company_id,
    })
}

/// Step 3: sanitize the tenant scope. After this, downstream code only ever
/// sees the validated `TenantId`.
pub fn enforce_tenant(ctx: &AuthContext) -> Result<TenantId, ApiError> {
    let raw = ctx.company_id.as_deref().unwrap_or("");
    TenantId::parse(raw).map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use workaccess_auth::{AccessPolicy, Environment};

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::minutes(10))
    }

    fn demo_policy() -> AccessPolicy {
        AccessPolicy::from_settings(Environment::NonProduction, None).unwrap()
    }

    fn token_only_policy() -> AccessPolicy {
        AccessPolicy::from_settings(Environment::NonProduction, Some("token-only")).unwrap()
    }

    fn prod_policy() -> AccessPolicy {
        AccessPolicy::from_settings(Environment::Production, Some("token-only")).unwrap()
    }

    fn meta(method: Method, path: &str) -> RequestMeta {
        RequestMeta {
            method,
            path: path.to_string(),
            authorization: None,
            demo_role: None,
            demo_company_id: None,
        }
    }

    #[test]
    fn public_routes_resolve_anonymous_even_in_production() {
        for (method, path) in [
            (Method::GET, "/health"),
            (Method::POST, "/public/register-company"),
            (Method::POST, "/auth/login"),
        ] {
            let ctx =
                resolve_identity(&prod_policy(), &codec(), &meta(method, path)).unwrap();
            assert_eq!(ctx, AuthContext::anonymous());
        }
    }

    #[test]
    fn wrong_method_on_public_path_is_not_exempt() {
        assert!(!is_public(&Method::GET, "/auth/login"));
        assert!(!is_public(&Method::POST, "/health"));
    }

    #[test]
    fn production_without_token_is_jwt_required_despite_demo_headers() {
        let mut m = meta(Method::GET, "/employees");
        m.demo_role = Some("hr".to_string());
        m.demo_company_id = Some("acme".to_string());
        let err = resolve_identity(&prod_policy(), &codec(), &m).unwrap_err();
        assert_eq!(err.code(), "JWT_REQUIRED");
    }

    #[test]
    fn token_only_mode_without_token_is_jwt_only() {
        let err =
            resolve_identity(&token_only_policy(), &codec(), &meta(Method::GET, "/employees"))
                .unwrap_err();
        assert_eq!(err.code(), "JWT_ONLY");
    }

    #[test]
    fn bearer_takes_precedence_over_demo_headers() {
        let c = codec();
        let token = c
            .sign("usr_1", "sec@acme.test", Role::Security, "acme")
            .unwrap();
        let mut m = meta(Method::GET, "/employees");
        m.authorization = Some(format!("Bearer {token}"));
        // Demo headers try to claim a stronger role and another tenant.
        m.demo_role = Some("manager".to_string());
        m.demo_company_id = Some("other".to_string());

        let ctx = resolve_identity(&demo_policy(), &c, &m).unwrap();
        assert_eq!(ctx.role, Role::Security);
        assert_eq!(ctx.company_id.as_deref(), Some("acme"));
        assert_eq!(ctx.user_id.as_deref(), Some("usr_1"));
    }

    #[test]
    fn malformed_authorization_header_is_token_invalid_not_demo_fallback() {
        for raw in ["Basic abc", "Bearer ", "Bearer"] {
            let mut m = meta(Method::GET, "/employees");
            m.authorization = Some(raw.to_string());
            m.demo_role = Some("hr".to_string());
            m.demo_company_id = Some("acme".to_string());
            let err = resolve_identity(&demo_policy(), &codec(), &m).unwrap_err();
            assert_eq!(err.code(), "TOKEN_INVALID", "{raw}");
        }
    }

    #[test]
    fn tenantless_token_is_its_own_code() {
        let c = codec();
        let token = c.sign("usr_1", "hr@acme.test", Role::Hr, "").unwrap();
        let mut m = meta(Method::GET, "/employees");
        m.authorization = Some(format!("Bearer {token}"));
        let err = resolve_identity(&demo_policy(), &c, &m).unwrap_err();
        assert_eq!(err.code(), "TOKEN_TENANT_MISSING");
    }

    #[test]
    fn demo_mode_derives_role_and_tenant_from_headers() {
        let mut m = meta(Method::GET, "/employees");
        m.demo_role = Some("HR".to_string());
        m.demo_company_id = Some(" acme ".to_string());
        let ctx = resolve_identity(&demo_policy(), &codec(), &m).unwrap();
        assert_eq!(ctx.role, Role::Hr);
        assert_eq!(ctx.company_id.as_deref(), Some("acme"));
        assert!(ctx.user_id.is_none());
    }

    #[test]
    fn unknown_demo_role_degrades_to_external() {
        let mut m = meta(Method::GET, "/employees");
        m.demo_role = Some("superadmin".to_string());
        let ctx = resolve_identity(&demo_policy(), &codec(), &m).unwrap();
        assert_eq!(ctx.role, Role::External);
    }

    #[test]
    fn tenant_enforcement_outcomes() {
        let mut ctx = AuthContext::anonymous();
        assert_eq!(enforce_tenant(&ctx).unwrap_err().code(), "TENANT_MISSING");

        ctx.company_id = Some("a".to_string());
        assert_eq!(enforce_tenant(&ctx).unwrap_err().code(), "TENANT_INVALID");

        ctx.company_id = Some("acme".to_string());
        assert_eq!(enforce_tenant(&ctx).unwrap().as_str(), "acme");
    }

    #[test]
    fn billing_allowlist_shape() {
        assert!(is_billing_exempt(&Method::GET, "/health"));
        assert!(is_billing_exempt(&Method::POST, "/public/register-company"));
        assert!(is_billing_exempt(&Method::POST, "/auth/login"));
        assert!(is_billing_exempt(&Method::GET, "/billing/status"));
        assert!(is_billing_exempt(&Method::POST, "/billing/activate"));
        assert!(is_billing_exempt(&Method::GET, "/company"));
        assert!(!is_billing_exempt(&Method::PUT, "/company"));
        assert!(!is_billing_exempt(&Method::GET, "/employees"));
        assert!(!is_billing_exempt(&Method::GET, "/audit"));
    }
}
