//! Employees and their trainings: the business surface that exercises the
//! full pipeline. Reads are open to any authenticated role; writes are
//! hr/manager and every write lands in the audit trail with before/after
//! snapshots.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use workaccess_audit::AuditDraft;
use workaccess_auth::AuthContext;
use workaccess_store::{EmployeeInput, EmployeeRecord, TrainingInput};

use crate::app::AppState;
use crate::context::TenantContext;
use crate::error::ApiError;
use crate::{middleware, routes};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/employees/:id/trainings", post(add_training))
        .route(
            "/employees/:id/trainings/:training_id",
            put(update_training).delete(delete_training),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::trial_gate))
        .route_layer(from_fn_with_state(
            routes::WRITE_ROLES,
            middleware::write_role_gate,
        ))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct EmployeeBody {
    name: Option<String>,
    position: Option<String>,
    email: Option<String>,
}

impl From<EmployeeBody> for EmployeeInput {
    fn from(body: EmployeeBody) -> Self {
        EmployeeInput {
            name: body.name,
            position: body.position,
            email: body.email,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TrainingBody {
    name: String,
    valid_from: String,
    valid_to: String,
}

impl TrainingBody {
    fn validated(self) -> Result<TrainingInput, ApiError> {
        let name = self.name.trim().to_string();
        let valid_from = self.valid_from.trim().to_string();
        let valid_to = self.valid_to.trim().to_string();
        if name.is_empty() || valid_from.is_empty() || valid_to.is_empty() {
            return Err(ApiError::validation_required(
                "Missing fields",
                &["name", "validFrom", "validTo"],
            ));
        }
        Ok(TrainingInput {
            name,
            valid_from,
            valid_to,
        })
    }
}

async fn list_employees(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
) -> Result<Json<Vec<EmployeeRecord>>, ApiError> {
    Ok(Json(state.employees.list(tenant.tenant_id()).await?))
}

async fn get_employee(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeRecord>, ApiError> {
    state
        .employees
        .get(tenant.tenant_id(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))
}

async fn create_employee(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<EmployeeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state
        .employees
        .create(tenant.tenant_id(), body.into())
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "employee.create", "employee")
                .entity_id(created.id.as_str())
                .meta(json!({ "employeeId": created.id }))
                .after(json!(created)),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_employee(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<EmployeeBody>,
) -> Result<Json<EmployeeRecord>, ApiError> {
    let (before, after) = state
        .employees
        .update(tenant.tenant_id(), &id, body.into())
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "employee.update", "employee")
                .entity_id(id.as_str())
                .meta(json!({ "employeeId": id }))
                .before(json!(before))
                .after(json!(after)),
        )
        .await?;

    Ok(Json(after))
}

async fn delete_employee(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.employees.delete(tenant.tenant_id(), &id).await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "employee.delete", "employee")
                .entity_id(id.as_str())
                .meta(json!({ "employeeId": id }))
                .before(json!(removed)),
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

async fn add_training(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<TrainingBody>,
) -> Result<impl IntoResponse, ApiError> {
    let input = body.validated()?;
    let (_, training) = state
        .employees
        .add_training(tenant.tenant_id(), &id, input)
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "training.create", "training")
                .entity_id(training.id.as_str())
                .meta(json!({ "employeeId": id, "trainingId": training.id }))
                .after(json!({ "employeeId": id, "training": training })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(training)))
}

async fn update_training(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, training_id)): Path<(String, String)>,
    Json(body): Json<TrainingBody>,
) -> Result<Json<Value>, ApiError> {
    let input = body.validated()?;
    let (before, after) = state
        .employees
        .update_training(tenant.tenant_id(), &id, &training_id, input)
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "training.update", "training")
                .entity_id(training_id.as_str())
                .meta(json!({ "employeeId": id, "trainingId": training_id }))
                .before(json!({ "employeeId": id, "training": before }))
                .after(json!({ "employeeId": id, "training": after })),
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}

async fn delete_training(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantContext>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, training_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let removed = state
        .employees
        .delete_training(tenant.tenant_id(), &id, &training_id)
        .await?;

    state
        .audit
        .append(
            tenant.tenant_id(),
            AuditDraft::new(ctx.role.as_str(), "training.delete", "training")
                .entity_id(training_id.as_str())
                .meta(json!({ "employeeId": id, "trainingId": training_id }))
                .before(json!({ "employeeId": id, "training": removed })),
        )
        .await?;

    Ok(Json(json!({ "ok": true })))
}
