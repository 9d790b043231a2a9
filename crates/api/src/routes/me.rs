use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use workaccess_auth::AuthContext;

use crate::app::AppState;
use crate::context::TenantContext;
use crate::middleware;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/me",
        get(me).layer(from_fn_with_state(state.clone(), middleware::trial_gate)),
    )
}

/// Who am I, and what can the UI let me do.
async fn me(
    Extension(ctx): Extension<AuthContext>,
    Extension(tenant): Extension<TenantContext>,
) -> Json<Value> {
    let can_write = ctx.role.can_write();
    Json(json!({
        "role": ctx.role,
        "userId": ctx.user_id,
        "companyId": tenant.tenant_id().as_str(),
        "perms": {
            "canAdd": can_write,
            "canDelete": can_write,
            "canClearDone": can_write,
        },
    }))
}
