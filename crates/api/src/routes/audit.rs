//! Audit trail read surface: filtered, cursor-paginated, JSON or CSV.

use axum::extract::{Query, State};
use axum::http::header;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use workaccess_audit::{to_csv, AuditQuery};

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::{middleware, routes};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/audit",
        get(list_audit)
            .layer(from_fn_with_state(state.clone(), middleware::trial_gate))
            .layer(from_fn_with_state(
                routes::LEDGER_READ_ROLES,
                middleware::role_gate,
            )),
    )
}

/// Query parameters, all optional and parsed permissively: a malformed
/// value behaves like an absent one.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct AuditListParams {
    limit: Option<String>,
    cursor: Option<String>,
    actor_role: Option<String>,
    action: Option<String>,
    entity_type: Option<String>,
    entity_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    format: Option<String>,
}

async fn list_audit(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(params): Query<AuditListParams>,
) -> Result<Response, ApiError> {
    let query = AuditQuery {
        limit: params.limit.as_deref().and_then(|v| v.trim().parse().ok()),
        cursor: params.cursor,
        actor_role: params.actor_role,
        action_prefix: params.action,
        entity_type: params.entity_type,
        entity_id: params.entity_id,
        from: params.from,
        to: params.to,
    };

    let page = state.audit.list(tenant.tenant_id(), &query).await?;

    if params.format.as_deref().map(str::trim) == Some("csv") {
        let body = to_csv(&page.items);
        return Ok((
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response());
    }

    Ok(Json(json!({
        "limit": page.limit,
        "count": page.items.len(),
        "nextCursor": page.next_cursor,
        "items": page.items,
    }))
    .into_response())
}
