//! Opaque resume marker for newest-first ledger scans.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encodes the `(ts, id)` of the last entry returned on the previous page.
///
/// The wire form is base64 so the internal encoding can change without
/// breaking clients; nothing storage-specific leaks into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub ts: String,
    pub id: String,
}

impl Cursor {
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}|{}", self.ts, self.id))
    }

    /// Decode a client-supplied cursor.
    ///
    /// Malformed input yields `None`: listing must never fail because of a
    /// bad cursor, it simply restarts from the newest entry.
    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (ts, id) = text.split_once('|')?;
        if ts.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            ts: ts.to_string(),
            id: id.to_string(),
        })
    }

    /// Cursor exclusion for a newest-first scan: keep entries strictly
    /// before the cursor position. Timestamps compare as strings, which is
    /// safe because the persisted format sorts lexicographically in time
    /// order.
    pub fn excludes(&self, ts: &str, id: &str) -> bool {
        !(ts < self.ts.as_str() || (ts == self.ts && id < self.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips() {
        let c = Cursor {
            ts: "2026-08-05T12:00:00.000Z".to_string(),
            id: "aud_x_1".to_string(),
        };
        assert_eq!(Cursor::decode(&c.encode()), Some(c));
    }

    #[test]
    fn malformed_cursors_decode_to_none() {
        for raw in ["", "!!!", "bm9wZQ", "fA"] {
            assert_eq!(Cursor::decode(raw), None, "{raw}");
        }
    }

    #[test]
    fn exclusion_keeps_strictly_older_entries() {
        let c = Cursor {
            ts: "2026-08-05T12:00:00.000Z".to_string(),
            id: "aud_b".to_string(),
        };
        // Older timestamp passes.
        assert!(!c.excludes("2026-08-05T11:59:59.999Z", "aud_z"));
        // Same timestamp, smaller id passes.
        assert!(!c.excludes("2026-08-05T12:00:00.000Z", "aud_a"));
        // The cursor entry itself is excluded.
        assert!(c.excludes("2026-08-05T12:00:00.000Z", "aud_b"));
        // Newer entries are excluded.
        assert!(c.excludes("2026-08-05T12:00:00.001Z", "aud_a"));
    }
}
