//! Record sink trait and error types
//!
//! This module defines the interface the crawl loop writes ads through, and
//! the errors a sink may raise. Every sink error is fatal to the run.

use crate::crawler::AdRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write row to {}: {source}", .path.display())]
    Write { path: PathBuf, source: csv::Error },

    #[error("Failed to flush {}: {source}", .path.display())]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to sync {} to disk: {source}", .path.display())]
    Sync {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for accepted ad records
///
/// Implementations must make each record durable before `append` returns, so
/// an interrupted run keeps every row it reported as written.
pub trait RecordSink {
    /// Appends one record
    ///
    /// # Arguments
    ///
    /// * `record` - The ad to write
    fn append(&mut self, record: &AdRecord) -> SinkResult<()>;

    /// Number of records appended so far (the header is not counted)
    fn rows_written(&self) -> u64;

    /// File backing this sink, if any
    fn path(&self) -> Option<&Path> {
        None
    }
}
