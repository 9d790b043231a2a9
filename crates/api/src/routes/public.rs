//! Self-service company registration (public, trial auto-start).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use workaccess_auth::{hash_password, Role};
use workaccess_core::TenantId;
use workaccess_store::NewUser;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub company_id: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

pub async fn register_company(
    State(state): State<AppState>,
    Json(body): Json<RegisterCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("Missing field: name"));
    }
    if body.company_id.trim().is_empty() {
        return Err(ApiError::validation("Missing field: companyId"));
    }
    if body.admin_email.trim().is_empty() {
        return Err(ApiError::validation("Missing field: adminEmail"));
    }
    if body.admin_password.is_empty() {
        return Err(ApiError::validation("Missing field: adminPassword"));
    }

    let slug = slugify(&body.company_id);
    let tenant =
        TenantId::parse(&slug).map_err(|_| ApiError::validation("Invalid companyId"))?;

    if state.store.tenant_exists(&tenant).await {
        return Err(ApiError::Conflict("Company already exists".to_string()));
    }
    state.store.create_tenant(&tenant).await?;

    // Profile with trial window.
    state.company.get_or_init(&tenant).await?;
    let now = Utc::now();
    let (_, profile) = state
        .company
        .update(&tenant, move |p| {
            p.name = name;
            p.start_trial(now);
            Ok(())
        })
        .await?;

    // First admin user, auto-logged-in.
    let password_hash = hash_password(&body.admin_password).map_err(|_| ApiError::Internal)?;
    let user = state
        .users
        .create(
            &tenant,
            NewUser {
                email: body.admin_email,
                name: body.admin_name,
                role: Role::Manager,
                password_hash,
            },
        )
        .await?;

    let token = state
        .codec
        .sign(&user.id, &user.email, user.role, &user.company_id)
        .map_err(|_| ApiError::Internal)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "companyId": tenant.as_str(),
            "trialStart": profile.trial_start,
            "trialEnd": profile.trial_end,
            "token": token,
            "user": user.public(),
        })),
    ))
}

/// Reduce a requested company id to the safe slug alphabet.
fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_dash = false;
    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
