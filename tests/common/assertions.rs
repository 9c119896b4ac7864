//! Domain-specific assertion macros for dbflow harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* query or edge broke and *where* in the pipeline.

use dbflow_core::{Edge, Graph};

// ---------------------------------------------------------------------------
// Canonical shape assertions
// ---------------------------------------------------------------------------

/// Assert that `sql` canonicalizes to `expected`.
///
/// ```rust
/// assert_shape!("SELECT * FROM t WHERE id = 1", "SELECT * FROM t WHERE");
/// ```
#[macro_export]
macro_rules! assert_shape {
    ($sql:expr, $expected:expr) => {{
        let sql: &str = $sql;
        let expected: &str = $expected;
        let actual = dbflow_core::canonicalize(sql);
        pretty_assertions::assert_eq!(
            actual,
            expected,
            "canonical shape mismatch for input {:?}",
            sql
        );
    }};
}

/// Assert that two queries share one canonical shape.
#[macro_export]
macro_rules! assert_same_shape {
    ($left:expr, $right:expr) => {{
        let left = dbflow_core::canonicalize($left);
        let right = dbflow_core::canonicalize($right);
        if left != right {
            panic!(
                "assert_same_shape! failed:\n  {:?}\n    => {:?}\n  {:?}\n    => {:?}",
                $left, left, $right, right
            );
        }
    }};
}

/// Assert that two queries have different canonical shapes.
#[macro_export]
macro_rules! assert_distinct_shape {
    ($left:expr, $right:expr) => {{
        let left = dbflow_core::canonicalize($left);
        if left == dbflow_core::canonicalize($right) {
            panic!(
                "assert_distinct_shape! failed: both {:?} and {:?} canonicalize to {:?}",
                $left, $right, left
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Edge assertions
// ---------------------------------------------------------------------------

/// Assert that a graph has an edge `source -[label]-> target`.
///
/// ```rust
/// assert_has_edge!(graph, "mysql:page", "SQL SELECT", "php:WikiPage::load");
/// ```
#[macro_export]
macro_rules! assert_has_edge {
    ($graph:expr, $source:expr, $label:expr, $target:expr) => {{
        let graph: &dbflow_core::Graph = &$graph;
        let (source, label, target): (&str, &str, &str) = ($source, $label, $target);
        if !graph
            .iter()
            .any(|e| e.source == source && e.edge_label == label && e.target == target)
        {
            panic!(
                "assert_has_edge! failed: no edge {:?} -[{:?}]-> {:?}\n  edges: {:#?}",
                source,
                label,
                target,
                graph.edges()
            );
        }
    }};
}

/// Find the single edge between `source` and `target`, panicking when there
/// is none or more than one.
pub fn only_edge<'g>(graph: &'g Graph, source: &str, target: &str) -> &'g Edge {
    let matching: Vec<&Edge> = graph
        .iter()
        .filter(|e| e.source == source && e.target == target)
        .collect();
    match matching.as_slice() {
        [edge] => *edge,
        [] => panic!("no edge {source:?} -> {target:?} in {:#?}", graph.edges()),
        many => panic!("{} edges {source:?} -> {target:?}: {many:#?}", many.len()),
    }
}
