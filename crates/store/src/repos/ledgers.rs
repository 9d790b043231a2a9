//! Persistence for the append-only audit and outbox ledgers.

use workaccess_audit::{
    page_audit, page_outbox, push_capped, AuditDraft, AuditEntry, AuditQuery, OutboxDraft,
    OutboxEntry, OutboxQuery, Page, LEDGER_CAP,
};
use workaccess_core::TenantId;

use crate::entity::{map_collection, read_collection, EntityStore, StoreError};

pub const AUDIT_ENTITY: &str = "audit";
pub const OUTBOX_ENTITY: &str = "outbox";

#[derive(Debug, Clone)]
pub struct AuditRepo<S> {
    store: S,
}

impl<S: EntityStore> AuditRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append one record; id and timestamp are assigned here and the ledger
    /// cap is enforced in the same locked cycle.
    pub async fn append(
        &self,
        tenant: &TenantId,
        draft: AuditDraft,
    ) -> Result<AuditEntry, StoreError> {
        let entry = AuditEntry::assign(tenant, draft);
        let stored = entry.clone();
        self.store
            .update(
                tenant,
                AUDIT_ENTITY,
                map_collection::<AuditEntry, _>(move |items| {
                    push_capped(items, stored, LEDGER_CAP);
                    Ok(())
                }),
            )
            .await?;
        Ok(entry)
    }

    pub async fn list(
        &self,
        tenant: &TenantId,
        query: &AuditQuery,
    ) -> Result<Page<AuditEntry>, StoreError> {
        let entries: Vec<AuditEntry> =
            read_collection(&self.store, tenant, AUDIT_ENTITY).await?;
        Ok(page_audit(&entries, query))
    }
}

#[derive(Debug, Clone)]
pub struct OutboxRepo<S> {
    store: S,
}

impl<S: EntityStore> OutboxRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn append(
        &self,
        tenant: &TenantId,
        draft: OutboxDraft,
    ) -> Result<OutboxEntry, StoreError> {
        let entry = OutboxEntry::assign(tenant, draft);
        let stored = entry.clone();
        self.store
            .update(
                tenant,
                OUTBOX_ENTITY,
                map_collection::<OutboxEntry, _>(move |items| {
                    push_capped(items, stored, LEDGER_CAP);
                    Ok(())
                }),
            )
            .await?;
        Ok(entry)
    }

    pub async fn list(
        &self,
        tenant: &TenantId,
        query: &OutboxQuery,
    ) -> Result<Page<OutboxEntry>, StoreError> {
        let entries: Vec<OutboxEntry> =
            read_collection(&self.store, tenant, OUTBOX_ENTITY).await?;
        Ok(page_outbox(&entries, query))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::InMemoryEntityStore;

    fn tenant() -> TenantId {
        TenantId::parse("acme").unwrap()
    }

    fn audit_repo() -> AuditRepo<Arc<InMemoryEntityStore>> {
        AuditRepo::new(Arc::new(InMemoryEntityStore::new()))
    }

    #[tokio::test]
    async fn append_assigns_distinct_ids_and_lists_newest_first() {
        let repo = audit_repo();
        let e1 = repo
            .append(&tenant(), AuditDraft::new("hr", "employee.create", "employee"))
            .await
            .unwrap();
        let e2 = repo
            .append(&tenant(), AuditDraft::new("hr", "employee.update", "employee"))
            .await
            .unwrap();
        assert_ne!(e1.id, e2.id);

        let page = repo.list(&tenant(), &AuditQuery::default()).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, e2.id);
        assert_eq!(page.items[1].id, e1.id);
    }

    #[tokio::test]
    async fn ledgers_are_tenant_isolated() {
        let repo = audit_repo();
        repo.append(&tenant(), AuditDraft::new("hr", "employee.create", "employee"))
            .await
            .unwrap();

        let other = TenantId::parse("globex").unwrap();
        let page = repo.list(&other, &AuditQuery::default()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn outbox_append_and_filtered_list() {
        let repo = OutboxRepo::new(Arc::new(InMemoryEntityStore::new()));
        repo.append(
            &tenant(),
            OutboxDraft {
                to: "alice@acme.test".to_string(),
                subject: "Document".to_string(),
                document_id: "doc_1".to_string(),
                transport: "noop".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let page = repo
            .list(
                &tenant(),
                &OutboxQuery {
                    document_id: Some("doc_1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].transport, "noop");
    }
}
