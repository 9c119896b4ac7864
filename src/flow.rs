//! Flow — fetch, adapt, reduce and write, end to end.

use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use dbflow_core::export::{self, OutputFormat};
use dbflow_core::{build_graph, Graph, KeywordTableExtractor, LogAdapter, RawLogRow};
use dbflow_feeds::{FeedError, FetchWindow, LogSource, RowFilter};

/// Everything one run needs besides the source.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub window: FetchWindow,
    pub filter: RowFilter,
    pub adapter: LogAdapter,
}

/// Fetch rows from `source` and reduce them to a graph.
pub async fn get_flow<S: LogSource>(source: &mut S, options: &FlowOptions) -> Result<Graph, FeedError> {
    tracing::info!(
        source = %source.describe(),
        period = options.window.period.get(),
        limit = options.window.limit,
        "fetching SQL log rows"
    );
    let report = source.fetch(&options.window, &options.filter).await?;
    tracing::info!(
        rows = report.rows.len(),
        malformed = report.malformed,
        filtered = report.filtered,
        outside_window = report.outside_window,
        truncated = report.truncated,
        "fetched SQL log rows"
    );

    Ok(graph_from_rows(&report.rows, options.window.period, &options.adapter))
}

/// Adapt `rows` and build the graph with the keyword table extractor.
pub fn graph_from_rows(rows: &[RawLogRow], period: NonZeroU64, adapter: &LogAdapter) -> Graph {
    let entries = rows.iter().map(|row| adapter.adapt(row));
    build_graph(entries, period, &KeywordTableExtractor)
}

/// Write `graph` as `<dir>/<basename>.<ext>` for every format, returning the
/// paths written.
pub fn write_outputs(
    graph: &Graph,
    dir: &Path,
    basename: &str,
    formats: &[OutputFormat],
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        tracing::info!("Saving to {format}...");
        let path = dir.join(format!("{basename}.{}", format.extension()));
        std::fs::write(&path, export::render(graph, format)?)?;
        written.push(path);
    }
    Ok(written)
}
