//! Outbox: record outgoing mail and expose the per-tenant send history.
//!
//! Actual SMTP delivery is out of scope here; sends are handed to a noop
//! transport and the outbox entry is the durable record.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use workaccess_audit::{make_id, AuditDraft, OutboxDraft, OutboxQuery};
use workaccess_auth::AuthContext;

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::{middleware, routes};

const PREVIEW_CHARS: usize = 160;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/outbox",
            get(list_outbox)
                .layer(from_fn_with_state(state.clone(), middleware::trial_gate))
                .layer(from_fn_with_state(
                    routes::LEDGER_READ_ROLES,
                    middleware::role_gate,
                )),
        )
        .route(
            "/send/email",
            post(send_email)
                .layer(from_fn_with_state(state.clone(), middleware::trial_gate))
                .layer(from_fn_with_state(
                    routes::WRITE_ROLES,
                    middleware::role_gate,
                )),
        )
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OutboxListParams {
    limit: Option<String>,
    cursor: Option<String>,
    /// Recipient substring filter.
    to: Option<String>,
    document_id: Option<String>,
    from: Option<String>,
    /// Upper date bound (named apart from the recipient filter).
    to_date: Option<String>,
}

async fn list_outbox(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Query(params): Query<OutboxListParams>,
) -> Result<Json<Value>, ApiError> {
    let query = OutboxQuery {
        limit: params.limit.as_deref().and_then(|v| v.trim().parse().ok()),
        cursor: params.cursor,
        to_contains: params.to,
        document_id: params.document_id,
        from: params.from,
        to: params.to_date,
    };

    let page = state.outbox.list(tenant.tenant_id(), &query).await?;
    Ok(Json(json!({
        "companyId": tenant.tenant_id().as_str(),
        "limit": page.limit,
        "count": page.items.len(),
        "nextCursor": page.next_cursor,
        "items": page.items,
    })))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SendEmailRequest {
    to: String,
    subject: String,
    message: String,
    document_id: String,
    filename: String,
}

async fn send_email(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<SendEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let to = body.to.trim().to_string();
    let subject = body.subject.trim().to_string();
    if to.is_empty() || subject.is_empty() {
        return Err(ApiError::validation_required(
            "Missing fields",
            &["to", "subject"],
        ));
    }

    let entry = state
        .outbox
        .append(
            tenant.tenant_id(),
            OutboxDraft {
                to,
                subject,
                message_preview: body.message.chars().take(PREVIEW_CHARS).collect(),
                document_id: body.document_id.trim().to_string(),
                filename: body.filename.trim().to_string(),
                transport: "noop".to_string(),
                message_id: make_id("msg"),
            },
        )
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "email.send", "outbox")
                .entity_id(entry.id.as_str())
                .meta(json!({
                    "to": entry.to,
                    "subject": entry.subject,
                    "documentId": entry.document_id,
                    "messageId": entry.message_id,
                })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "entry": entry }))))
}
