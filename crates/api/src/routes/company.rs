//! Tenant profile: read (billing-exempt) and role-gated update.

use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use workaccess_audit::AuditDraft;
use workaccess_auth::AuthContext;
use workaccess_billing::{AlertSettings, CompanyProfile};

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::{middleware, routes};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/company",
        get(get_company)
            .put(put_company)
            .layer(from_fn_with_state(state.clone(), middleware::trial_gate))
            .layer(from_fn_with_state(
                routes::WRITE_ROLES,
                middleware::write_role_gate,
            )),
    )
}

async fn get_company(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<CompanyProfile>, ApiError> {
    let profile = state.company.get_or_init(tenant.tenant_id()).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AlertsBody {
    expirations_days: Option<i64>,
    digest_email: Option<String>,
    digest_recipient_contact_id: Option<String>,
    last_digest_sent_on: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CompanyUpdateRequest {
    name: Option<String>,
    ico: Option<String>,
    dic: Option<String>,
    address: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    country: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    alerts: Option<AlertsBody>,
}

async fn put_company(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<CompanyUpdateRequest>,
) -> Result<Json<CompanyProfile>, ApiError> {
    let now = Utc::now();
    let (before, after) = state
        .company
        .update(tenant.tenant_id(), move |p| {
            apply_patch(p, body);
            p.touch(now);
            Ok(())
        })
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "company.update", "company")
                .entity_id(tenant.tenant_id().as_str())
                .before(json!(before))
                .after(json!(after)),
        )
        .await?;

    Ok(Json(after))
}

fn apply_patch(p: &mut CompanyProfile, body: CompanyUpdateRequest) {
    let set = |target: &mut String, value: Option<String>| {
        if let Some(v) = value {
            *target = v.trim().to_string();
        }
    };
    set(&mut p.name, body.name);
    set(&mut p.ico, body.ico);
    set(&mut p.dic, body.dic);
    set(&mut p.address, body.address);
    set(&mut p.city, body.city);
    set(&mut p.zip, body.zip);
    set(&mut p.country, body.country);
    set(&mut p.email, body.email);
    set(&mut p.phone, body.phone);
    if p.country.is_empty() {
        p.country = "CZ".to_string();
    }

    if let Some(alerts) = body.alerts {
        if let Some(days) = alerts.expirations_days {
            p.alerts.expirations_days = AlertSettings::clamp_expirations_days(days);
        }
        set(&mut p.alerts.digest_email, alerts.digest_email);
        set(
            &mut p.alerts.digest_recipient_contact_id,
            alerts.digest_recipient_contact_id,
        );
        set(&mut p.alerts.last_digest_sent_on, alerts.last_digest_sent_on);
    }
}
