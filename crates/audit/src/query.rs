//! Newest-first, cursor-paginated reads over a tenant ledger.
//!
//! Filters are conjunctive. Malformed filter values are dropped rather than
//! rejected: listing must never be the reason a tenant cannot see their own
//! history.

use chrono::{DateTime, Utc};

use workaccess_core::time;

use crate::cursor::Cursor;
use crate::ledger::{AuditEntry, OutboxEntry};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(raw: Option<usize>) -> usize {
    raw.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// One page of a newest-first scan.
///
/// `next_cursor` is present **only** when the page is full: a short page
/// unambiguously signals "no more data", so clients never loop on empty
/// pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub limit: usize,
}

/// Filters for an audit ledger read.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    pub actor_role: Option<String>,
    pub action_prefix: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Filters for an outbox ledger read.
#[derive(Debug, Clone, Default)]
pub struct OutboxQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    /// Case-blind substring match on the recipient.
    pub to_contains: Option<String>,
    pub document_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

trait Paged {
    fn ts(&self) -> &str;
    fn id(&self) -> &str;
}

impl Paged for AuditEntry {
    fn ts(&self) -> &str {
        &self.ts
    }
    fn id(&self) -> &str {
        &self.id
    }
}

impl Paged for OutboxEntry {
    fn ts(&self) -> &str {
        &self.ts
    }
    fn id(&self) -> &str {
        &self.id
    }
}

/// Order newest-first by `(ts, id)`, apply cursor exclusion, cut one page.
fn paginate<T: Paged>(mut items: Vec<T>, cursor: Option<&Cursor>, limit: usize) -> Page<T> {
    items.sort_by(|a, b| (b.ts(), b.id()).cmp(&(a.ts(), a.id())));
    if let Some(c) = cursor {
        items.retain(|e| !c.excludes(e.ts(), e.id()));
    }
    items.truncate(limit);
    let next_cursor = if items.len() == limit {
        items.last().map(|e| {
            Cursor {
                ts: e.ts().to_string(),
                id: e.id().to_string(),
            }
            .encode()
        })
    } else {
        None
    };
    Page {
        items,
        next_cursor,
        limit,
    }
}

fn ts_within(ts: &str, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    // Entries with unparseable timestamps fall out of any dated window.
    let Some(t) = time::parse_date_like(ts) else {
        return false;
    };
    from.is_none_or(|f| t >= f) && to.is_none_or(|u| t <= u)
}

fn clean(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Page through a tenant audit ledger.
pub fn page_audit(entries: &[AuditEntry], query: &AuditQuery) -> Page<AuditEntry> {
    let limit = clamp_limit(query.limit);
    let cursor = clean(&query.cursor).and_then(Cursor::decode);
    let from = clean(&query.from).and_then(time::parse_date_like);
    let to = clean(&query.to).and_then(time::parse_date_like);

    let actor_role = clean(&query.actor_role);
    let action_prefix = clean(&query.action_prefix);
    let entity_type = clean(&query.entity_type);
    let entity_id = clean(&query.entity_id);

    let filtered: Vec<AuditEntry> = entries
        .iter()
        .filter(|e| actor_role.is_none_or(|v| e.actor_role == v))
        .filter(|e| action_prefix.is_none_or(|v| e.action.starts_with(v)))
        .filter(|e| entity_type.is_none_or(|v| e.entity_type == v))
        .filter(|e| entity_id.is_none_or(|v| e.entity_id.as_deref() == Some(v)))
        .filter(|e| ts_within(&e.ts, from, to))
        .cloned()
        .collect();

    paginate(filtered, cursor.as_ref(), limit)
}

/// Page through a tenant outbox ledger.
pub fn page_outbox(entries: &[OutboxEntry], query: &OutboxQuery) -> Page<OutboxEntry> {
    let limit = clamp_limit(query.limit);
    let cursor = clean(&query.cursor).and_then(Cursor::decode);
    let from = clean(&query.from).and_then(time::parse_date_like);
    let to = clean(&query.to).and_then(time::parse_date_like);

    let to_contains = clean(&query.to_contains).map(|s| s.to_ascii_lowercase());
    let document_id = clean(&query.document_id);

    let filtered: Vec<OutboxEntry> = entries
        .iter()
        .filter(|e| {
            to_contains
                .as_deref()
                .is_none_or(|v| e.to.to_ascii_lowercase().contains(v))
        })
        .filter(|e| document_id.is_none_or(|v| e.document_id == v))
        .filter(|e| ts_within(&e.ts, from, to))
        .cloned()
        .collect();

    paginate(filtered, cursor.as_ref(), limit)
}
