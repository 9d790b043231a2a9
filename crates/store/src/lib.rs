//! `workaccess-store` — tenant-scoped persistence over flat JSON files.
//!
//! One directory per tenant, one JSON document per entity name. All
//! mutations run as serialized read-modify-write cycles keyed by
//! `(tenant, entity)`, which closes the lost-update window without ever
//! letting one tenant's writes block another's.

pub mod entity;
pub mod fs;
pub mod memory;
pub mod repos;

pub use entity::{
    decode_collection, decode_document, map_collection, map_document, read_collection,
    EntityStore, StoreError, UpdateFn, UpdateOutcome,
};
pub use fs::FsEntityStore;
pub use memory::InMemoryEntityStore;
pub use repos::company::{CompanyRepo, COMPANY_ENTITY};
pub use repos::employees::{
    EmployeeInput, EmployeeRecord, EmployeeRepo, Training, TrainingInput, EMPLOYEES_ENTITY,
};
pub use repos::ledgers::{AuditRepo, OutboxRepo, AUDIT_ENTITY, OUTBOX_ENTITY};
pub use repos::users::{NewUser, PublicUser, UserRecord, UserRepo, USERS_ENTITY};
