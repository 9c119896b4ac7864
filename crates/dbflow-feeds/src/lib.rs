//! dbflow-feeds — log sources for dbflow.
//!
//! Each source reads JSON log documents, one per line, and hands back the
//! [`RawLogRow`]s that fall inside a [`FetchWindow`] and pass a [`RowFilter`].
//! A line that is not valid JSON is counted and skipped; it never aborts the
//! batch.

pub mod document;
pub mod file;
pub mod stdin;

use std::future::Future;
use std::num::NonZeroU64;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use dbflow_core::RawLogRow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub use document::{parse_document, RowFilter};
pub use file::FileSource;
pub use stdin::StdinSource;

/// Failure to read a log source. Bad lines inside the input are counted in
/// [`FetchReport`] instead.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The source could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Reading failed part way through.
    #[error("failed to read log input: {0}")]
    Read(#[from] std::io::Error),
}

/// Which rows a fetch returns: at most `limit`, logged within the `period`
/// seconds up to `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub period: NonZeroU64,
    pub limit: usize,
    pub until: DateTime<Utc>,
}

impl FetchWindow {
    pub fn ending_now(period: NonZeroU64, limit: usize) -> Self {
        Self {
            period,
            limit,
            until: Utc::now(),
        }
    }

    /// Earliest timestamp inside the window.
    pub fn start(&self) -> DateTime<Utc> {
        i64::try_from(self.period.get())
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|span| self.until.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Rows without a timestamp cannot be placed and are kept.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        match timestamp {
            Some(ts) => ts >= self.start() && ts <= self.until,
            None => true,
        }
    }
}

/// Outcome of one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    /// Accepted rows in input order.
    pub rows: Vec<RawLogRow>,
    /// Non-blank lines read.
    pub lines: usize,
    /// Lines that were not a JSON object.
    pub malformed: usize,
    /// Documents lacking the required field.
    pub filtered: usize,
    /// Documents logged outside the window.
    pub outside_window: usize,
    /// Reading stopped at `limit` rows while non-blank input remained.
    /// The remaining lines are not parsed, so one of them may be a row that
    /// would have been dropped.
    pub truncated: bool,
}

/// A source of raw SQL log rows.
pub trait LogSource {
    /// Human-readable name for log messages.
    fn describe(&self) -> String;

    fn fetch(
        &mut self,
        window: &FetchWindow,
        filter: &RowFilter,
    ) -> impl Future<Output = Result<FetchReport, FeedError>> + Send;
}

/// Read JSON-lines log documents from `reader`.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub async fn read_rows<R>(
    mut reader: R,
    window: &FetchWindow,
    filter: &RowFilter,
) -> Result<FetchReport, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut report = FetchReport::default();
    let mut buf = Vec::new();

    while report.rows.len() < window.limit {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(report);
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.lines += 1;

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            Ok(_) => {
                tracing::warn!(line = report.lines, "skipping log line: not a JSON object");
                report.malformed += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(line = report.lines, error = %e, "skipping malformed log line");
                report.malformed += 1;
                continue;
            }
        };

        if !filter.matches(&value) {
            report.filtered += 1;
            continue;
        }

        let row = parse_document(&value);
        if !window.contains(row.timestamp) {
            report.outside_window += 1;
            continue;
        }
        report.rows.push(row);
    }

    report.truncated = has_more_lines(&mut reader, &mut buf).await?;
    Ok(report)
}

/// Consume lines until a non-blank one turns up or the input ends.
async fn has_more_lines<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        buf.clear();
        if reader.read_until(b'\n', buf).await? == 0 {
            return Ok(false);
        }
        if !buf.trim_ascii().is_empty() {
            return Ok(true);
        }
    }
}
