//! JSON-lines file source.

use std::path::{Path, PathBuf};

use tokio::io::BufReader;

use crate::{read_rows, FeedError, FetchReport, FetchWindow, LogSource, RowFilter};

/// Reads log documents from a file, e.g. an Elasticsearch export.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(
        &mut self,
        window: &FetchWindow,
        filter: &RowFilter,
    ) -> Result<FetchReport, FeedError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|source| FeedError::Open {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), "reading log file");
        read_rows(BufReader::new(file), window, filter).await
    }
}
