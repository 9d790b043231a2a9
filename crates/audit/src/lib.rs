//! `workaccess-audit` — append-only per-tenant ledgers (pure core).
//!
//! Entry models, id/timestamp assignment, the opaque pagination cursor, the
//! newest-first page scan, and the CSV projection. Persistence lives in
//! `workaccess-store`; everything here is deterministic over in-memory
//! slices so the pagination contract is testable without I/O.

pub mod csv;
pub mod cursor;
pub mod ledger;
pub mod query;

pub use csv::to_csv;
pub use cursor::Cursor;
pub use ledger::{
    make_id, push_capped, AuditDraft, AuditEntry, OutboxDraft, OutboxEntry, LEDGER_CAP,
};
pub use query::{
    clamp_limit, page_audit, page_outbox, AuditQuery, OutboxQuery, Page, DEFAULT_LIMIT, MAX_LIMIT,
};
