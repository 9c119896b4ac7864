//! Log adapter — turns one [`RawLogRow`] into a [`NormalizedEntry`].
//!
//! The adapter never fails. A row without a message yields an entry with no
//! canonical query, which the grouper drops; a missing database or method is
//! reported as [`UNKNOWN_FIELD`].

use crate::canonicalizer;
use crate::config::AdapterConfig;
use crate::types::{NormalizedEntry, RawLogRow};

/// Placeholder for a database or method the row did not carry.
pub const UNKNOWN_FIELD: &str = "unknown";

/// How rows are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Literal prefix stripped from the message before canonicalization.
    pub message_prefix: String,
    /// Prefix of the emitting context, `php` gives `php:<method>`.
    pub context_prefix: String,
    /// `(from, to)` database renames, checked in order.
    pub aliases: Vec<(String, String)>,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            message_prefix: "SQL ".to_string(),
            context_prefix: "php".to_string(),
            aliases: vec![
                ("uportal.mysql".to_string(), "mysql".to_string()),
                ("default".to_string(), "mysql".to_string()),
            ],
        }
    }
}

impl From<&AdapterConfig> for AdapterOptions {
    fn from(cfg: &AdapterConfig) -> Self {
        Self {
            message_prefix: cfg.message_prefix.clone(),
            context_prefix: cfg.context_prefix.clone(),
            aliases: cfg
                .database_aliases
                .iter()
                .map(|a| (a.from.clone(), a.to.clone()))
                .collect(),
        }
    }
}

/// Row → entry mapping with fixed [`AdapterOptions`].
#[derive(Debug, Clone, Default)]
pub struct LogAdapter {
    options: AdapterOptions,
}

impl LogAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    pub fn adapt(&self, row: &RawLogRow) -> NormalizedEntry {
        let canonical_query = row.message.as_deref().map(|message| {
            let sql = message
                .strip_prefix(self.options.message_prefix.as_str())
                .unwrap_or(message);
            canonicalizer::canonicalize(sql)
        });

        let database = self.resolve_database(row.database.as_deref().unwrap_or(UNKNOWN_FIELD));
        let method = row.method.as_deref().unwrap_or(UNKNOWN_FIELD);

        NormalizedEntry {
            database,
            canonical_query,
            context: format!("{}:{}", self.options.context_prefix, method),
        }
    }

    /// Apply the alias table; unmatched names pass through.
    pub fn resolve_database(&self, name: &str) -> String {
        self.options
            .aliases
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| to.clone())
            .unwrap_or_else(|| name.to_string())
    }
}
