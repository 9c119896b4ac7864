//! Export layer — serialises a [`Graph`] as TSV, Graphviz or JSON.
//!
//! TSV lines are `source<TAB>edge_label<TAB>target<TAB>metadata`. Tabs and
//! line breaks inside a field are replaced with a space so every line splits
//! back into exactly four fields ([`parse_tsv_line`]).

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::types::{Edge, Graph};

/// Output format of a rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tsv,
    Graphviz,
    Json,
}

impl OutputFormat {
    /// File extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Graphviz => "gv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "TSV"),
            OutputFormat::Graphviz => write!(f, "GV"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

/// Render `graph` in `format`, newline-terminated.
pub fn render(graph: &Graph, format: OutputFormat) -> anyhow::Result<String> {
    let lines = match format {
        OutputFormat::Tsv => format_tsv_lines(graph),
        OutputFormat::Graphviz => format_graphviz_lines(graph),
        OutputFormat::Json => return Ok(to_json(graph)? + "\n"),
    };
    Ok(join_lines(&lines))
}

fn join_lines(lines: &[String]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// TSV
// ---------------------------------------------------------------------------

pub fn format_tsv_lines(graph: &Graph) -> Vec<String> {
    graph
        .iter()
        .map(|edge| {
            format!(
                "{}\t{}\t{}\t{}",
                tsv_field(&edge.source),
                tsv_field(&edge.edge_label),
                tsv_field(&edge.target),
                tsv_field(&edge.metadata),
            )
        })
        .collect()
}

/// Parse one line written by [`format_tsv_lines`].
pub fn parse_tsv_line(line: &str) -> Option<Edge> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut fields = line.split('\t');
    let edge = Edge {
        source: fields.next()?.to_string(),
        edge_label: fields.next()?.to_string(),
        target: fields.next()?.to_string(),
        metadata: fields.next()?.to_string(),
    };
    match fields.next() {
        Some(_) => None,
        None => Some(edge),
    }
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

// ---------------------------------------------------------------------------
// Graphviz
// ---------------------------------------------------------------------------

/// Colours available in the `pastel28` scheme.
const PALETTE_SIZE: usize = 8;

/// Lines of a Graphviz `digraph`.
///
/// Nodes are numbered in order of first appearance and coloured by the part
/// of their label before the first `:`, so all `mysql:*` tables share one
/// colour and all `php:*` call-sites another.
pub fn format_graphviz_lines(graph: &Graph) -> Vec<String> {
    let mut nodes: Vec<&str> = Vec::new();
    let mut node_ids: HashMap<&str, usize> = HashMap::new();
    let mut groups: HashMap<&str, usize> = HashMap::new();

    for edge in graph {
        for label in [edge.source.as_str(), edge.target.as_str()] {
            if !node_ids.contains_key(label) {
                nodes.push(label);
                node_ids.insert(label, nodes.len());
            }
            let group = node_group(label);
            let next = groups.len();
            groups.entry(group).or_insert(next);
        }
    }

    let mut lines = vec![
        "digraph G {".to_string(),
        "    graph [ center=true, margin=0.75, nodesep=0.5, ranksep=0.75, rankdir=LR ];"
            .to_string(),
        "    node [ shape=box, style=\"rounded,filled\", width=0, height=0, fontname=Helvetica, fontsize=11 ];"
            .to_string(),
        "    edge [ fontname=Helvetica, fontsize=9 ];".to_string(),
        String::new(),
        "    // nodes".to_string(),
    ];

    for (i, label) in nodes.iter().enumerate() {
        let color = groups[node_group(label)] % PALETTE_SIZE + 1;
        lines.push(format!(
            "    n{} [ label=\"{}\", colorscheme=pastel28, color={} ];",
            i + 1,
            dot_escape(label),
            color
        ));
    }

    lines.push(String::new());
    lines.push("    // edges".to_string());

    for edge in graph {
        lines.push(format!(
            "    n{} -> n{} [ label=\"{}\\n{}\" ];",
            node_ids[edge.source.as_str()],
            node_ids[edge.target.as_str()],
            dot_escape(&edge.edge_label),
            dot_escape(&edge.metadata)
        ));
    }

    lines.push("}".to_string());
    lines
}

fn node_group(label: &str) -> &str {
    label.split_once(':').map_or(label, |(group, _)| group)
}

fn dot_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Pretty-printed JSON array of edges.
pub fn to_json(graph: &Graph) -> serde_json::Result<String> {
    serde_json::to_string_pretty(graph)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
