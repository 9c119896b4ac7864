//! Test builders — ergonomic constructors for rows, entries and log documents.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use dbflow_core::{NormalizedEntry, RawLogRow};

// ---------------------------------------------------------------------------
// RawLogRowBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`RawLogRow`] test fixtures.
///
/// # Example
///
/// ```rust
/// let row = RawLogRowBuilder::sql("SELECT * FROM page WHERE page_id = 1")
///     .database("wikicities")
///     .method("WikiPage::load")
///     .build();
/// ```
pub struct RawLogRowBuilder {
    message: Option<String>,
    database: Option<String>,
    method: Option<String>,
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl RawLogRowBuilder {
    /// Row whose message is `SQL <sql>`, as the SQL logger writes it.
    pub fn sql(sql: &str) -> Self {
        Self::message(format!("SQL {sql}"))
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            database: Some("mysql".to_string()),
            method: Some("Test::method".to_string()),
            timestamp: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            message: None,
            database: None,
            method: None,
            timestamp: None,
        }
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn timestamp(mut self, ts: &str) -> Self {
        self.timestamp = Some(ts.parse().expect("valid RFC 3339 timestamp"));
        self
    }

    pub fn build(self) -> RawLogRow {
        RawLogRow {
            message: self.message,
            database: self.database,
            method: self.method,
            timestamp: self.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Build a row for `sql` sent to `database` by `method`.
pub fn sql_row(database: &str, method: &str, sql: &str) -> RawLogRow {
    RawLogRowBuilder::sql(sql)
        .database(database)
        .method(method)
        .build()
}

/// Build an already-normalised entry.
pub fn entry(database: &str, canonical_query: &str, context: &str) -> NormalizedEntry {
    NormalizedEntry {
        database: database.to_string(),
        canonical_query: Some(canonical_query.to_string()),
        context: context.to_string(),
    }
}

/// One JSON log document line, shaped like the SQL logger output.
pub fn document_line(database: &str, method: &str, sql: &str, timestamp: &str) -> String {
    serde_json::json!({
        "@timestamp": timestamp,
        "@message": format!("SQL {sql}"),
        "@fields": { "database": { "name": database } },
        "@context": { "method": method, "rows": 1 },
    })
    .to_string()
}
