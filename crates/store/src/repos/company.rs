//! Company profile persistence (singleton document per tenant).

use workaccess_billing::CompanyProfile;
use workaccess_core::{time, TenantId};

use crate::entity::{decode_document, map_document, EntityStore, StoreError};

pub const COMPANY_ENTITY: &str = "company";

#[derive(Debug, Clone)]
pub struct CompanyRepo<S> {
    store: S,
}

impl<S: EntityStore> CompanyRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the profile, creating defaults on first touch and backfilling
    /// fields older documents are missing. The migrated form is persisted
    /// whenever it differs from what was stored.
    pub async fn get_or_init(&self, tenant: &TenantId) -> Result<CompanyProfile, StoreError> {
        let current = self.store.read(tenant, COMPANY_ENTITY).await?;
        let mut profile: CompanyProfile = match decode_document(current.clone()) {
            Some(p) => p,
            None => CompanyProfile::new(tenant),
        };

        profile.company_id = tenant.as_str().to_string();
        if profile.created_at.is_empty() {
            profile.created_at = time::now_iso();
        }
        if profile.updated_at.is_empty() {
            profile.updated_at = profile.created_at.clone();
        }

        let as_value = serde_json::to_value(&profile).map_err(StoreError::Serialize)?;
        if current.as_ref() != Some(&as_value) {
            self.store.write(tenant, COMPANY_ENTITY, &as_value).await?;
        }
        Ok(profile)
    }

    /// Patch the profile under the per-key lock.
    ///
    /// Returns the profile before and after the patch, both observed within
    /// the same locked cycle.
    pub async fn update<F>(
        &self,
        tenant: &TenantId,
        patch: F,
    ) -> Result<(CompanyProfile, CompanyProfile), StoreError>
    where
        F: FnOnce(&mut CompanyProfile) -> Result<(), StoreError> + Send + 'static,
    {
        let tenant_str = tenant.as_str().to_string();
        let fallback = CompanyProfile::new(tenant);
        let outcome = self
            .store
            .update(
                tenant,
                COMPANY_ENTITY,
                map_document(fallback.clone(), move |profile: &mut CompanyProfile| {
                    profile.company_id = tenant_str;
                    patch(profile)
                }),
            )
            .await?;

        let before: CompanyProfile = decode_document(outcome.before).unwrap_or(fallback);
        let after: CompanyProfile =
            serde_json::from_value(outcome.after).map_err(StoreError::Serialize)?;
        Ok((before, after))
    }
}
