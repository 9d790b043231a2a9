//! Billing self-service: status, activation, cancellation.
//!
//! These routes sit on the trial-gate allowlist by construction (and by the
//! gate's own path check): a locked tenant must always be able to pay.

use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use workaccess_audit::AuditDraft;
use workaccess_auth::{AuthContext, Role};
use workaccess_billing::{self as billing, CompanyProfile};
use workaccess_core::time;

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::middleware;

const MANAGE_ROLES: &[Role] = &[Role::Manager];

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/billing/status", get(status))
        .route(
            "/billing/activate",
            post(activate).layer(from_fn_with_state(MANAGE_ROLES, middleware::role_gate)),
        )
        .route(
            "/billing/cancel",
            post(cancel).layer(from_fn_with_state(MANAGE_ROLES, middleware::role_gate)),
        )
}

async fn status(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<Value>, ApiError> {
    let profile = state.company.get_or_init(tenant.tenant_id()).await?;
    let now = Utc::now();

    let trial_expired = billing::trial_expired(&profile, now);
    let subscription_active = billing::subscription_active(&profile, now);

    Ok(Json(json!({
        "companyId": profile.company_id,
        "trial": {
            "start": profile.trial_start,
            "end": profile.trial_end,
            "expired": trial_expired,
        },
        "subscription": {
            "status": profile.subscription_status,
            "plan": profile.plan,
            "paymentProvider": profile.payment_provider,
            "start": profile.subscription_start,
            "end": profile.subscription_end,
            "active": subscription_active,
            "expired": billing::subscription_expired(&profile, now),
        },
        "isLocked": trial_expired && !subscription_active,
    })))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ActivateRequest {
    plan: Option<String>,
    days: Option<i64>,
    until: Option<String>,
}

async fn activate(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<Value>, ApiError> {
    let plan = body
        .plan
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("basic")
        .to_string();

    let now = Utc::now();
    let end = match body.until.as_deref().and_then(time::parse_date_like) {
        Some(until) => until,
        None => {
            let days = body.days.unwrap_or(30).clamp(1, 3650);
            now + Duration::days(days)
        }
    };

    let plan_for_patch = plan.clone();
    let (before, after) = state
        .company
        .update(tenant.tenant_id(), move |p| {
            p.activate_subscription(plan_for_patch, "manual".to_string(), now, end);
            Ok(())
        })
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "billing.activate", "company")
                .entity_id(tenant.tenant_id().as_str())
                .meta(json!({
                    "plan": plan,
                    "subscriptionEnd": after.subscription_end,
                    "paymentProvider": "manual",
                }))
                .before(subscription_snapshot(&before))
                .after(subscription_snapshot(&after)),
        )
        .await?;

    Ok(Json(json!({
        "ok": true,
        "companyId": after.company_id,
        "subscription": subscription_snapshot(&after),
    })))
}

async fn cancel(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let (before, after) = state
        .company
        .update(tenant.tenant_id(), move |p| {
            p.cancel_subscription(now);
            Ok(())
        })
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "billing.cancel", "company")
                .entity_id(tenant.tenant_id().as_str())
                .before(subscription_snapshot(&before))
                .after(subscription_snapshot(&after)),
        )
        .await?;

    Ok(Json(json!({
        "ok": true,
        "companyId": after.company_id,
        "subscription": subscription_snapshot(&after),
    })))
}

fn subscription_snapshot(p: &CompanyProfile) -> Value {
    json!({
        "status": p.subscription_status,
        "plan": p.plan,
        "paymentProvider": p.payment_provider,
        "start": p.subscription_start,
        "end": p.subscription_end,
    })
}
