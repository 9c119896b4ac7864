//! Core types for dbflow-core.
//!
//! This module defines the data structures shared across the pipeline: the
//! raw [`RawLogRow`] handed over by a log source, the [`NormalizedEntry`]
//! produced from it, and the [`Edge`]s that make up a [`Graph`].

use serde::{Deserialize, Serialize};

/// One SQL-call log record as fetched from the log store.
///
/// Every field is optional. Sources fill what they can find in the document;
/// the adapter decides which gaps are defaulted and which make the row unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLogRow {
    /// Log message, usually the SQL text behind an `SQL ` prefix.
    pub message: Option<String>,
    /// Database name the query was sent to (before aliasing).
    pub database: Option<String>,
    /// Method that issued the query.
    pub method: Option<String>,
    /// Time the query was logged.
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// A log row reduced to what identifies a query shape and its caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedEntry {
    /// Database name after aliasing.
    pub database: String,
    /// Canonical query shape, `None` when the row carried no usable SQL.
    pub canonical_query: Option<String>,
    /// Emitting context, e.g. `php:Wikia\Search::query`.
    pub context: String,
}

/// One directed, labelled relationship between a call-site and a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub edge_label: String,
    pub target: String,
    pub metadata: String,
}

/// Edges in the order their groups were reduced.
///
/// Edges are never merged, so two groups that resolve to the same endpoints
/// produce two edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Graph {
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl From<Vec<Edge>> for Graph {
    fn from(edges: Vec<Edge>) -> Self {
        Self { edges }
    }
}

impl FromIterator<Edge> for Graph {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Edge;
    type IntoIter = std::vec::IntoIter<Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Statement kind of an SQL text: its first whitespace-delimited token, uppercased.
///
/// Returns an empty string for blank input.
pub fn statement_kind(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_default()
}
