//! Grouper / reducer — one [`Edge`] per `(database, canonical query)` group.
//!
//! Entries are grouped in a single forward pass. Groups keep insertion order
//! and so does the resulting [`Graph`]; the first entry pushed into a group
//! is its representative, which makes the output reproducible as long as the
//! input row order is.

use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::tables::{primary_table, TableExtractor};
use crate::types::{statement_kind, Edge, Graph, NormalizedEntry};

/// Statement kinds whose edge points from the table to the caller.
const READ_KINDS: &[&str] = &["SELECT"];

/// Grouping key: `"<database>-<canonical_query>"`.
///
/// The plain concatenation can collide when the database name itself contains
/// `-` (`a-b` + `c` vs `a` + `b-c`).
pub fn group_key(database: &str, canonical_query: &str) -> String {
    format!("{database}-{canonical_query}")
}

/// Entries sharing one grouping key, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: String,
    entries: Vec<NormalizedEntry>,
}

impl Group {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The first entry pushed into the group.
    pub fn representative(&self) -> &NormalizedEntry {
        // groups are created with their first entry
        &self.entries[0]
    }

    pub fn entries(&self) -> &[NormalizedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical query shared by all entries.
    pub fn canonical_query(&self) -> &str {
        self.representative()
            .canonical_query
            .as_deref()
            .unwrap_or_default()
    }
}

/// Insertion-ordered accumulator of [`Group`]s.
#[derive(Debug, Default)]
pub struct Grouper {
    index: HashMap<String, usize>,
    groups: Vec<Group>,
    dropped: usize,
}

impl Grouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to its group. Entries without a canonical query are
    /// dropped; returns whether the entry was kept.
    pub fn push(&mut self, entry: NormalizedEntry) -> bool {
        let Some(query) = entry.canonical_query.as_deref() else {
            self.dropped += 1;
            return false;
        };
        let key = group_key(&entry.database, query);

        match self.index.get(&key) {
            Some(&i) => self.groups[i].entries.push(entry),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(Group {
                    key,
                    entries: vec![entry],
                });
            }
        }
        true
    }

    /// Entries dropped so far for lacking a canonical query.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

impl Extend<NormalizedEntry> for Grouper {
    fn extend<I: IntoIterator<Item = NormalizedEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Reduce a group to its edge.
///
/// Reads (`SELECT`) flow from the table node to the caller; every other kind
/// flows from the caller to the table node.
pub fn reduce_group<E>(group: &Group, period: NonZeroU64, extractor: &E) -> Edge
where
    E: TableExtractor + ?Sized,
{
    let first = group.representative();
    let sql = group.canonical_query();

    let table = primary_table(extractor, sql);
    let kind = statement_kind(sql);
    let table_node = format!("{}:{}", first.database, table);
    let qps = group.len() as f64 / period.get() as f64;

    tracing::debug!(
        key = group.key(),
        size = group.len(),
        context = %first.context,
        table = %table_node,
        "reducing group"
    );

    let (source, target) = if READ_KINDS.contains(&kind.as_str()) {
        (table_node, first.context.clone())
    } else {
        (first.context.clone(), table_node)
    };

    Edge {
        source,
        edge_label: format!("SQL {kind}"),
        target,
        metadata: format!("{qps:.3} QPS"),
    }
}

/// Group `entries` and reduce every group, in first-seen order.
pub fn build_graph<I, E>(entries: I, period: NonZeroU64, extractor: &E) -> Graph
where
    I: IntoIterator<Item = NormalizedEntry>,
    E: TableExtractor + ?Sized,
{
    let mut grouper = Grouper::new();
    let mut total = 0usize;
    for entry in entries {
        total += 1;
        grouper.push(entry);
    }

    tracing::info!(
        entries = total,
        dropped = grouper.dropped(),
        groups = grouper.groups().len(),
        "mapped log entries"
    );

    grouper
        .into_groups()
        .iter()
        .map(|group| reduce_group(group, period, extractor))
        .collect()
}
