use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Parse a stored timestamp. Rows written by the reference schema carry
/// RFC 3339 text; older rows may use SQLite's `datetime('now')` format.
pub(crate) fn parse_timestamp(raw: &str, row_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on row {}: {}", raw, row_id, e);
            DateTime::default()
        })
}
