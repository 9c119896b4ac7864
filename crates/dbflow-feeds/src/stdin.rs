//! Stdin source — log documents piped into the process.

use tokio::io::BufReader;

use crate::{read_rows, FeedError, FetchReport, FetchWindow, LogSource, RowFilter};

/// Reads log documents from standard input until EOF or the row limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

impl LogSource for StdinSource {
    fn describe(&self) -> String {
        "stdin".to_string()
    }

    async fn fetch(
        &mut self,
        window: &FetchWindow,
        filter: &RowFilter,
    ) -> Result<FetchReport, FeedError> {
        read_rows(BufReader::new(tokio::io::stdin()), window, filter).await
    }
}
