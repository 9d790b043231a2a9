//! File-backed entity store: `<root>/<tenant>/<entity>.json`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex as AsyncMutex;

use workaccess_core::TenantId;

use crate::entity::{EntityStore, StoreError, UpdateFn, UpdateOutcome};

/// Flat-file store with per-(tenant, entity) write serialization.
///
/// Each key owns an async mutex held for the whole read-modify-write cycle,
/// so two concurrent mutations of the same document cannot drop each other's
/// writes. The lock map itself is only touched briefly to fetch a handle;
/// no tenant ever waits on another tenant's lock.
///
/// Documents are written to a temp file and renamed into place, so readers
/// never observe a half-written file.
#[derive(Debug)]
pub struct FsEntityStore {
    root: PathBuf,
    locks: Mutex<HashMap<(String, String), Arc<AsyncMutex<()>>>>,
}

impl FsEntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the tenant's directory exists (i.e. the tenant was ever
    /// registered or written to).
    pub async fn tenant_exists(&self, tenant: &TenantId) -> bool {
        fs::metadata(self.tenant_dir(tenant))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Create the tenant's directory.
    pub async fn create_tenant(&self, tenant: &TenantId) -> Result<(), StoreError> {
        fs::create_dir_all(self.tenant_dir(tenant)).await?;
        Ok(())
    }

    fn tenant_dir(&self, tenant: &TenantId) -> PathBuf {
        // TenantId is validated to [A-Za-z0-9_-]{2,64}; safe as a path segment.
        self.root.join(tenant.as_str())
    }

    fn entity_path(&self, tenant: &TenantId, entity: &str) -> PathBuf {
        self.tenant_dir(tenant).join(format!("{entity}.json"))
    }

    fn lock_for(&self, tenant: &TenantId, entity: &str) -> Arc<AsyncMutex<()>> {
        let key = (tenant.as_str().to_string(), entity.to_string());
        let mut map = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(key).or_default().clone()
    }

    async fn read_raw(
        &self,
        tenant: &TenantId,
        entity: &str,
    ) -> Result<Option<Value>, StoreError> {
        let path = self.entity_path(tenant, entity);
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let doc = serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            tenant: tenant.as_str().to_string(),
            entity: entity.to_string(),
            source,
        })?;
        Ok(Some(doc))
    }

    async fn write_raw(
        &self,
        tenant: &TenantId,
        entity: &str,
        doc: &Value,
    ) -> Result<(), StoreError> {
        let path = self.entity_path(tenant, entity);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(doc).map_err(StoreError::Serialize)?;
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FsEntityStore {
    async fn read(&self, tenant: &TenantId, entity: &str) -> Result<Option<Value>, StoreError> {
        self.read_raw(tenant, entity).await
    }

    async fn write(&self, tenant: &TenantId, entity: &str, doc: &Value) -> Result<(), StoreError> {
        let lock = self.lock_for(tenant, entity);
        let _guard = lock.lock().await;
        self.write_raw(tenant, entity, doc).await
    }

    async fn update(
        &self,
        tenant: &TenantId,
        entity: &str,
        apply: UpdateFn,
    ) -> Result<UpdateOutcome, StoreError> {
        let lock = self.lock_for(tenant, entity);
        let _guard = lock.lock().await;
        let before = self.read_raw(tenant, entity).await?;
        let after = apply(before.clone())?;
        self.write_raw(tenant, entity, &after).await?;
        Ok(UpdateOutcome { before, after })
    }
}
