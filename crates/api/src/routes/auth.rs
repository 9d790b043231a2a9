//! Login: verify per-tenant credentials, mint a stateless access token.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use workaccess_auth::verify_password;
use workaccess_core::TenantId;

use crate::app::AppState;
use crate::error::{ApiError, AuthCode};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub company_id: String,
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation_required(
            "Missing credentials",
            &["companyId", "email", "password"],
        ));
    }
    let tenant = TenantId::parse(&body.company_id)?;

    let key = format!("{}:{}", tenant, body.email.trim().to_lowercase());
    if !state.limiter.check(&key) {
        return Err(ApiError::RateLimited);
    }

    let user = state
        .users
        .find_by_email(&tenant, &body.email)
        .await?
        .filter(|u| verify_password(&body.password, &u.password_hash));

    let Some(user) = user else {
        state.limiter.record_failure(&key);
        return Err(ApiError::Unauthorized(AuthCode::InvalidCredentials));
    };
    state.limiter.reset(&key);

    let token = state
        .codec
        .sign(&user.id, &user.email, user.role, &user.company_id)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(json!({ "token": token, "user": user.public() })))
}
