//! In-memory entity store for tests and ephemeral setups.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use workaccess_core::TenantId;

use crate::entity::{EntityStore, StoreError, UpdateFn, UpdateOutcome};

/// Map-backed store with the same contract as the file store.
///
/// A single map-wide mutex is coarser than the file store's per-key locks,
/// which is acceptable for the test workloads this backs.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: AsyncMutex<HashMap<(String, String), Value>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(tenant: &TenantId, entity: &str) -> (String, String) {
        (tenant.as_str().to_string(), entity.to_string())
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn read(&self, tenant: &TenantId, entity: &str) -> Result<Option<Value>, StoreError> {
        let map = self.inner.lock().await;
        Ok(map.get(&Self::key(tenant, entity)).cloned())
    }

    async fn write(&self, tenant: &TenantId, entity: &str, doc: &Value) -> Result<(), StoreError> {
        let mut map = self.inner.lock().await;
        map.insert(Self::key(tenant, entity), doc.clone());
        Ok(())
    }

    async fn update(
        &self,
        tenant: &TenantId,
        entity: &str,
        apply: UpdateFn,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut map = self.inner.lock().await;
        let key = Self::key(tenant, entity);
        let before = map.get(&key).cloned();
        let after = apply(before.clone())?;
        map.insert(key, after.clone());
        Ok(UpdateOutcome { before, after })
    }
}
