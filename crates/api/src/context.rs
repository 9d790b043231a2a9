use workaccess_core::TenantId;

/// Sanitized tenant scope for a request.
///
/// Inserted only after tenant enforcement succeeds, so handlers and gates
/// can never observe an unsanitized tenant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}
