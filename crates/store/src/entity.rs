//! The tenant-scoped entity store abstraction.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use workaccess_core::{DomainError, TenantId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt document {tenant}/{entity}: {source}")]
    Corrupt {
        tenant: String,
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A mutation closure aborted for a business reason; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Mutation applied inside a serialized read-modify-write cycle.
///
/// Receives the current document (`None` when never written) and returns the
/// replacement. Returning an error aborts the cycle without writing.
pub type UpdateFn = Box<dyn FnOnce(Option<Value>) -> Result<Value, StoreError> + Send>;

/// Documents observed by one read-modify-write cycle, both taken while the
/// per-key lock was held.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub before: Option<Value>,
    pub after: Value,
}

/// Tenant-scoped document store: one JSON document per (tenant, entity).
///
/// Contract: mutations to the same (tenant, entity) pair are observed in the
/// order they were issued; operations on different tenants have no ordering
/// relationship and must not share locks.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Read the current document, or `None` if it has never been written.
    async fn read(&self, tenant: &TenantId, entity: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document.
    async fn write(&self, tenant: &TenantId, entity: &str, doc: &Value) -> Result<(), StoreError>;

    /// Serialized read-modify-write for one (tenant, entity) pair.
    async fn update(
        &self,
        tenant: &TenantId,
        entity: &str,
        apply: UpdateFn,
    ) -> Result<UpdateOutcome, StoreError>;
}

#[async_trait]
impl<S> EntityStore for std::sync::Arc<S>
where
    S: EntityStore + ?Sized,
{
    async fn read(&self, tenant: &TenantId, entity: &str) -> Result<Option<Value>, StoreError> {
        (**self).read(tenant, entity).await
    }

    async fn write(&self, tenant: &TenantId, entity: &str, doc: &Value) -> Result<(), StoreError> {
        (**self).write(tenant, entity, doc).await
    }

    async fn update(
        &self,
        tenant: &TenantId,
        entity: &str,
        apply: UpdateFn,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update(tenant, entity, apply).await
    }
}

/// Decode a collection document. Anything that is not a well-formed array of
/// records reads as empty rather than failing: collections self-heal on the
/// next write.
pub fn decode_collection<T: DeserializeOwned>(doc: Option<Value>) -> Vec<T> {
    match doc {
        Some(v @ Value::Array(_)) => serde_json::from_value(v).unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Decode a singleton document. Collections created by the generic store
/// bootstrap (a bare array) and malformed objects read as `None`.
pub fn decode_document<T: DeserializeOwned>(doc: Option<Value>) -> Option<T> {
    match doc {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    }
}

/// Read and decode a collection in one step.
pub async fn read_collection<S, T>(
    store: &S,
    tenant: &TenantId,
    entity: &str,
) -> Result<Vec<T>, StoreError>
where
    S: EntityStore + ?Sized,
    T: DeserializeOwned,
{
    Ok(decode_collection(store.read(tenant, entity).await?))
}

/// Lift a typed mutation over a collection into an [`UpdateFn`].
pub fn map_collection<T, F>(f: F) -> UpdateFn
where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce(&mut Vec<T>) -> Result<(), StoreError> + Send + 'static,
{
    Box::new(move |doc| {
        let mut items: Vec<T> = decode_collection(doc);
        f(&mut items)?;
        serde_json::to_value(&items).map_err(StoreError::Serialize)
    })
}

/// Lift a typed mutation over a singleton document into an [`UpdateFn`].
///
/// `fallback` seeds the document when it is absent or unreadable.
pub fn map_document<T, F>(fallback: T, f: F) -> UpdateFn
where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce(&mut T) -> Result<(), StoreError> + Send + 'static,
{
    Box::new(move |doc| {
        let mut value: T = decode_document(doc).unwrap_or(fallback);
        f(&mut value)?;
        serde_json::to_value(&value).map_err(StoreError::Serialize)
    })
}
