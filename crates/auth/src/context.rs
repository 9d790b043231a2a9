use crate::Role;

/// Identity resolved for one request.
///
/// Created once by the identity resolver, read by every downstream gate and
/// handler, discarded when the request ends. Never persisted.
///
/// `company_id` is the raw claim/header value; tenant enforcement turns it
/// into a validated `TenantId` before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub role: Role,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
}

impl AuthContext {
    /// Context for public (unauthenticated) routes.
    pub fn anonymous() -> Self {
        Self {
            role: Role::External,
            user_id: None,
            company_id: None,
        }
    }
}
