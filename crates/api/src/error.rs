//! Uniform error envelope and the centralized translator.
//!
//! Every gate and handler propagates `ApiError`; nothing catches and
//! suppresses an authorization or tenant error on the way up. The envelope
//! is `{error, code, message, path, method}` plus condition-specific extras;
//! `path` and `method` are attached by the outermost middleware so the
//! mapping lives in exactly one place.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use workaccess_auth::Role;
use workaccess_core::DomainError;
use workaccess_store::StoreError;

/// Machine codes for the 401 family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCode {
    TokenInvalid,
    TokenTenantMissing,
    JwtRequired,
    JwtOnly,
    InvalidCredentials,
}

impl AuthCode {
    fn code(self) -> &'static str {
        match self {
            AuthCode::TokenInvalid => "TOKEN_INVALID",
            AuthCode::TokenTenantMissing => "TOKEN_TENANT_MISSING",
            AuthCode::JwtRequired => "JWT_REQUIRED",
            AuthCode::JwtOnly => "JWT_ONLY",
            AuthCode::InvalidCredentials => "INVALID_CREDENTIALS",
        }
    }

    fn message(self) -> &'static str {
        match self {
            AuthCode::TokenInvalid => "Invalid or expired token.",
            AuthCode::TokenTenantMissing => "Token carries no tenant (companyId) claim.",
            AuthCode::JwtRequired => "Authentication token is required in production.",
            AuthCode::JwtOnly => "Authentication token is required (demo headers are disabled).",
            AuthCode::InvalidCredentials => "Invalid login credentials.",
        }
    }
}

/// Every rejection the pipeline or a handler can produce.
#[derive(Debug, Clone)]
pub enum ApiError {
    Unauthorized(AuthCode),
    TenantMissing,
    TenantInvalid,
    Forbidden {
        role: Role,
        allowed: &'static [Role],
    },
    TrialExpired {
        company_id: String,
        trial_end: String,
    },
    NotFound(String),
    Validation {
        message: String,
        required: &'static [&'static str],
    },
    Conflict(String),
    RateLimited,
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            required: &[],
        }
    }

    pub fn validation_required(
        message: impl Into<String>,
        required: &'static [&'static str],
    ) -> Self {
        Self::Validation {
            message: message.into(),
            required,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::TenantMissing | ApiError::TenantInvalid | ApiError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::TrialExpired { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::TenantMissing | ApiError::TenantInvalid | ApiError::Validation { .. } => {
                "BadRequest"
            }
            ApiError::Forbidden { .. } => "Forbidden",
            ApiError::TrialExpired { .. } => "TrialExpired",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::RateLimited => "TooManyRequests",
            ApiError::Internal => "Internal",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(c) => c.code(),
            ApiError::TenantMissing => "TENANT_MISSING",
            ApiError::TenantInvalid => "TENANT_INVALID",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::TrialExpired { .. } => "TrialExpired",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Validation { .. } => "VALIDATION_FAILED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::Internal => "INTERNAL",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(c) => c.message().to_string(),
            ApiError::TenantMissing => {
                "Missing companyId (tenant context is required).".to_string()
            }
            ApiError::TenantInvalid => {
                "Invalid companyId. Allowed: 2-64 chars [a-zA-Z0-9_-].".to_string()
            }
            ApiError::Forbidden { role, .. } => {
                format!("Role '{role}' is not allowed for this action.")
            }
            ApiError::TrialExpired { .. } => {
                "Trial has expired. Activate a plan to continue.".to_string()
            }
            ApiError::NotFound(msg) | ApiError::Validation { message: msg, .. } => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::RateLimited => "Too many attempts. Try again later.".to_string(),
            ApiError::Internal => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.name(),
            "code": self.code(),
            "message": self.message(),
        });
        match &self {
            ApiError::Forbidden { role, allowed } => {
                body["role"] = json!(role);
                body["allowedRoles"] = json!(allowed);
            }
            ApiError::TrialExpired {
                company_id,
                trial_end,
            } => {
                body["companyId"] = json!(company_id);
                body["trialEnd"] = json!(trial_end);
            }
            ApiError::Validation { required, .. } if !required.is_empty() => {
                body["required"] = json!(required);
            }
            _ => {}
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::TenantMissing => ApiError::TenantMissing,
            DomainError::TenantInvalid => ApiError::TenantInvalid,
            DomainError::Validation(msg) => ApiError::validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(domain) => domain.into(),
            other => {
                // Storage details never leak to clients.
                tracing::error!(error = %other, "storage failure");
                ApiError::Internal
            }
        }
    }
}

/// Centralized translator: stamps `path` and `method` onto every JSON error
/// body. Applied as the outermost layer so every rejection passes through it
/// exactly once.
pub async fn attach_request_context(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let res = next.run(req).await;
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }

    let (mut parts, body) = res.into_parts();
    let bytes = match axum::body::to_bytes(body, 1 << 20).await {
        Ok(b) => b,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert("path".to_string(), Value::String(path));
            map.insert("method".to_string(), Value::String(method.to_string()));
            let buf = serde_json::to_vec(&Value::Object(map)).unwrap_or_else(|_| bytes.to_vec());
            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(buf.len()));
            Response::from_parts(parts, Body::from(buf))
        }
        // Non-JSON error bodies (framework rejections) pass through untouched.
        _ => Response::from_parts(parts, Body::from(bytes)),
    }
}
