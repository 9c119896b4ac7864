//! Log document → [`RawLogRow`] mapping.
//!
//! Documents follow the syslog-ng / Elasticsearch layout the SQL logger
//! writes:
//!
//! ```json
//! {
//!   "@timestamp": "2024-01-15T10:00:00Z",
//!   "@message": "SQL SELECT * FROM page WHERE page_id = 1",
//!   "@fields": { "database": { "name": "wikicities" } },
//!   "@context": { "method": "WikiPage::load", "rows": 1 }
//! }
//! ```
//!
//! A search hit wrapper (`{"_source": {...}}`) is unwrapped first.

use chrono::{DateTime, Utc};
use dbflow_core::RawLogRow;
use serde_json::Value;

/// Map a log document to a row. Missing or mistyped fields become `None`.
pub fn parse_document(value: &Value) -> RawLogRow {
    let doc = unwrap_hit(value);
    RawLogRow {
        message: string_at(doc, "/@message"),
        database: string_at(doc, "/@fields/database/name"),
        method: string_at(doc, "/@context/method"),
        timestamp: doc.get("@timestamp").and_then(parse_timestamp),
    }
}

/// Documents must carry a field at a dotted path (`@context.rows`) to count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    required_field: Option<String>,
}

impl RowFilter {
    pub fn new(required_field: Option<&str>) -> Self {
        Self {
            required_field: required_field
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    pub fn required_field(&self) -> Option<&str> {
        self.required_field.as_deref()
    }

    pub fn matches(&self, value: &Value) -> bool {
        let Some(path) = &self.required_field else {
            return true;
        };
        let mut current = unwrap_hit(value);
        for segment in path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return false,
            }
        }
        !current.is_null()
    }
}

fn unwrap_hit(value: &Value) -> &Value {
    match value.get("_source") {
        Some(source @ Value::Object(_)) => source,
        _ => value,
    }
}

fn string_at(doc: &Value, pointer: &str) -> Option<String> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// RFC 3339 strings or Unix epoch seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
