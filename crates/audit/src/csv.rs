//! CSV projection for audit export.
//!
//! A pure projection over already-listed items, independent of the
//! pagination mechanism.

use crate::ledger::AuditEntry;

pub const CSV_HEADER: &str = "ts,id,actorRole,action,entityType,entityId";

/// Render entries as CSV with the fixed header. Every value is
/// double-quoted; internal quotes are doubled.
pub fn to_csv(items: &[AuditEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for e in items {
        let fields = [
            e.ts.as_str(),
            e.id.as_str(),
            e.actor_role.as_str(),
            e.action.as_str(),
            e.entity_type.as_str(),
            e.entity_id.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal CSV reader for round-trip checks: handles quoted fields,
    /// doubled quotes, and embedded commas/newlines.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut chars = input.chars().peekable();
        let mut in_quotes = false;
        while let Some(c) = chars.next() {
            if in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(c);
                }
            } else {
                match c {
                    '"' => in_quotes = true,
                    ',' => row.push(std::mem::take(&mut field)),
                    '\n' => {
                        row.push(std::mem::take(&mut field));
                        rows.push(std::mem::take(&mut row));
                    }
                    _ => field.push(c),
                }
            }
        }
        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }
        rows
    }

    fn entry(id: &str, action: &str) -> AuditEntry {
        AuditEntry {
            id: id.to_string(),
            ts: "2026-08-05T10:00:00.000Z".to_string(),
            actor_role: "hr".to_string(),
            action: action.to_string(),
            entity_type: "employee".to_string(),
            entity_id: Some("emp_1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn header_matches_contract() {
        let csv = to_csv(&[]);
        assert_eq!(csv, "ts,id,actorRole,action,entityType,entityId\n");
    }

    #[test]
    fn round_trips_every_projected_field() {
        let mut tricky = entry("aud_1", "say \"hi\", twice");
        tricky.entity_id = None;
        let items = vec![tricky, entry("aud_2", "employee.create")];

        let rows = parse_csv(&to_csv(&items));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["ts", "id", "actorRole", "action", "entityType", "entityId"]);

        for (row, e) in rows[1..].iter().zip(items.iter()) {
            assert_eq!(row[0], e.ts);
            assert_eq!(row[1], e.id);
            assert_eq!(row[2], e.actor_role);
            assert_eq!(row[3], e.action);
            assert_eq!(row[4], e.entity_type);
            assert_eq!(row[5], e.entity_id.clone().unwrap_or_default());
        }
    }

    #[test]
    fn embedded_newlines_survive() {
        let mut e = entry("aud_nl", "line1\nline2");
        e.actor_role = "security".to_string();
        let rows = parse_csv(&to_csv(&[e]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][3], "line1\nline2");
    }
}
