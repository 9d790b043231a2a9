//! Request middleware: context resolution, role gates, subscription gate.
//!
//! Composition order per business route is context → role gate → trial gate
//! → handler. The context middleware sits on the protected router; the two
//! gates are attached per route at registration time.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use chrono::Utc;

use workaccess_auth::{AuthContext, Role};

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::pipeline;

/// Identity resolution + tenant enforcement for every protected route.
pub async fn require_context(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let meta = pipeline::RequestMeta::from_parts(req.method(), req.uri().path(), req.headers());
    let ctx = pipeline::resolve_identity(&state.policy, &state.codec, &meta)?;
    let tenant = pipeline::enforce_tenant(&ctx)?;

    req.extensions_mut().insert(ctx);
    req.extensions_mut().insert(TenantContext::new(tenant));
    Ok(next.run(req).await)
}

/// Role gate for routes where every method shares one allowed-role set.
pub async fn role_gate(
    State(allowed): State<&'static [Role]>,
    Extension(ctx): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !allowed.contains(&ctx.role) {
        return Err(ApiError::Forbidden {
            role: ctx.role,
            allowed,
        });
    }
    Ok(next.run(req).await)
}

/// Role gate that only applies to mutating methods; reads stay open to any
/// authenticated role.
pub async fn write_role_gate(
    State(allowed): State<&'static [Role]>,
    Extension(ctx): Extension<AuthContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let method = req.method();
    let mutating =
        !(*method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS);
    if mutating && !allowed.contains(&ctx.role) {
        return Err(ApiError::Forbidden {
            role: ctx.role,
            allowed,
        });
    }
    Ok(next.run(req).await)
}

/// Subscription/trial gate. Loads the tenant profile and rejects with 402
/// once the trial has lapsed without an active subscription. The allowlist
/// check stays inside the gate so an exempt route is exempt no matter where
/// the layer ends up.
pub async fn trial_gate(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if pipeline::is_billing_exempt(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let profile = state.company.get_or_init(tenant.tenant_id()).await?;
    if workaccess_billing::is_locked(&profile, Utc::now()) {
        return Err(ApiError::TrialExpired {
            company_id: profile.company_id,
            trial_end: profile.trial_end,
        });
    }
    Ok(next.run(req).await)
}
