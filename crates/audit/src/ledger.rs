//! Ledger entry models and append-time assignment.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use workaccess_core::{time, TenantId};

/// Maximum entries retained per tenant ledger; the oldest are dropped first
/// when the cap is exceeded.
pub const LEDGER_CAP: usize = 5_000;

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Ledger ids sort with time: a base-36 millisecond prefix, a process-wide
/// sequence component that keeps same-millisecond ids in append order, and a
/// short random suffix.
pub fn make_id(prefix: &str) -> String {
    let ms = Utc::now().timestamp_millis().max(0) as u128;
    let seq = SEQ.fetch_add(1, Ordering::Relaxed) as u128 % SEQ_SPACE;
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(4).collect();
    format!(
        "{}_{}_{}{}",
        prefix,
        base36(ms),
        base36_padded(seq, 4),
        suffix
    )
}

// 36^4; the sequence wraps far beyond any plausible same-millisecond burst.
const SEQ_SPACE: u128 = 1_679_616;

fn base36_padded(n: u128, width: usize) -> String {
    let s = base36(n);
    format!("{s:0>width$}")
}

fn base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out.iter().rev().collect()
}

/// Append an entry and enforce the ledger cap, oldest first.
pub fn push_capped<T>(items: &mut Vec<T>, entry: T, cap: usize) {
    items.push(entry);
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

/// One append-only audit record.
///
/// `id` and `ts` are assigned at write time and never reused or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditEntry {
    pub id: String,
    pub ts: String,
    pub company_id: String,
    pub actor_role: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub meta: Value,
    pub before: Value,
    pub after: Value,
}

impl Default for AuditEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            ts: String::new(),
            company_id: String::new(),
            actor_role: "unknown".to_string(),
            action: "unknown".to_string(),
            entity_type: "unknown".to_string(),
            entity_id: None,
            meta: Value::Object(Map::new()),
            before: Value::Null,
            after: Value::Null,
        }
    }
}

/// Caller-supplied fields for one audit record; id and ts are assigned at
/// append time.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub actor_role: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub meta: Value,
    pub before: Value,
    pub after: Value,
}

impl AuditDraft {
    pub fn new(
        actor_role: impl Into<String>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            actor_role: actor_role.into(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            meta: Value::Object(Map::new()),
            before: Value::Null,
            after: Value::Null,
        }
    }

    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn before(mut self, before: Value) -> Self {
        self.before = before;
        self
    }

    pub fn after(mut self, after: Value) -> Self {
        self.after = after;
        self
    }
}

impl AuditEntry {
    /// Materialize a draft into a record, assigning id and timestamp.
    pub fn assign(company_id: &TenantId, draft: AuditDraft) -> Self {
        Self {
            id: make_id("aud"),
            ts: time::now_iso(),
            company_id: company_id.as_str().to_string(),
            actor_role: draft.actor_role,
            action: draft.action,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            meta: draft.meta,
            before: draft.before,
            after: draft.after,
        }
    }
}

/// One outbox record: a message the system handed to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OutboxEntry {
    pub id: String,
    pub ts: String,
    pub company_id: String,
    pub to: String,
    pub subject: String,
    pub message_preview: String,
    pub document_id: String,
    pub filename: String,
    pub transport: String,
    pub message_id: String,
}

/// Caller-supplied fields for one outbox record.
#[derive(Debug, Clone, Default)]
pub struct OutboxDraft {
    pub to: String,
    pub subject: String,
    pub message_preview: String,
    pub document_id: String,
    pub filename: String,
    pub transport: String,
    pub message_id: String,
}

impl OutboxEntry {
    pub fn assign(company_id: &TenantId, draft: OutboxDraft) -> Self {
        Self {
            id: make_id("out"),
            ts: time::now_iso(),
            company_id: company_id.as_str().to_string(),
            to: draft.to,
            subject: draft.subject,
            message_preview: draft.message_preview,
            document_id: draft.document_id,
            filename: draft.filename,
            transport: draft.transport,
            message_id: draft.message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix_and_are_unique() {
        let a = make_id("aud");
        let b = make_id("aud");
        assert!(a.starts_with("aud_") && b.starts_with("aud_"));
        assert_ne!(a, b);
    }

    #[test]
    fn ids_sort_in_append_order() {
        let ids: Vec<String> = (0..200).map(|_| make_id("aud")).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn assign_stamps_id_ts_and_tenant() {
        let tenant = TenantId::parse("acme").unwrap();
        let entry = AuditEntry::assign(
            &tenant,
            AuditDraft::new("hr", "employee.create", "employee").entity_id("emp_1"),
        );
        assert!(!entry.id.is_empty() && !entry.ts.is_empty());
        assert_eq!(entry.company_id, "acme");
        assert_eq!(entry.entity_id.as_deref(), Some("emp_1"));
    }

    #[test]
    fn push_capped_drops_oldest_first() {
        let mut items: Vec<u32> = (0..5).collect();
        push_capped(&mut items, 5, 5);
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn push_capped_below_cap_keeps_everything() {
        let mut items = vec![1, 2];
        push_capped(&mut items, 3, 5);
        assert_eq!(items, vec![1, 2, 3]);
    }
}
