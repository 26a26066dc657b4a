//! Durable CSV output
//!
//! The CSV file is written one row at a time. After every row the csv buffer
//! is flushed and the file data is synced, so killing the process at any point
//! leaves a readable file holding the header and every completed row.

use crate::crawler::AdRecord;
use crate::output::traits::{RecordSink, SinkError, SinkResult};
use chrono::NaiveDateTime;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Column headers, in field order
pub const CSV_HEADER: [&str; 5] = ["Title", "Price", "Link", "Time Listed", "Location"];

/// Timestamp layout used in output file names
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Builds the output file name `<prefix>_<YYYY-MM-DD>_<HH-MM-SS>.csv`
///
/// # Examples
///
/// ```
/// use ad_harvester::output::output_file_name;
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(9, 5, 3).unwrap();
/// assert_eq!(output_file_name("phones", &at), "phones_2026-10-18_09-05-03.csv");
/// ```
pub fn output_file_name(prefix: &str, timestamp: &NaiveDateTime) -> String {
    format!("{}_{}.csv", prefix, timestamp.format(FILE_TIMESTAMP_FORMAT))
}

/// CSV file sink with per-row durability
pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: u64,
}

impl CsvSink {
    /// Creates the timestamped output file and writes the header row
    ///
    /// The directory is created if needed. An existing file with the same name
    /// is never overwritten.
    ///
    /// # Arguments
    ///
    /// * `directory` - Where to create the file
    /// * `prefix` - File name prefix, usually the listing category
    /// * `timestamp` - Run start time, embedded in the file name
    ///
    /// # Returns
    ///
    /// * `Ok(CsvSink)` - File created, header durable on disk
    /// * `Err(SinkError)` - The file could not be created or written
    pub fn create(directory: &Path, prefix: &str, timestamp: NaiveDateTime) -> SinkResult<Self> {
        let path = directory.join(output_file_name(prefix, &timestamp));

        let create_error = |source| SinkError::Create {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(directory).map_err(create_error)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(create_error)?;

        // Header is written by hand so it exists even if no ad is ever found
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let mut sink = Self {
            writer,
            path,
            rows_written: 0,
        };

        sink.writer
            .write_record(CSV_HEADER)
            .map_err(|source| SinkError::Write {
                path: sink.path.clone(),
                source,
            })?;
        sink.commit()?;

        tracing::info!("Writing ads to {}", sink.path.display());
        Ok(sink)
    }

    /// Flushes buffered rows and syncs file data to the storage device
    fn commit(&mut self) -> SinkResult<()> {
        self.writer.flush().map_err(|source| SinkError::Flush {
            path: self.path.clone(),
            source,
        })?;

        self.writer
            .get_ref()
            .sync_data()
            .map_err(|source| SinkError::Sync {
                path: self.path.clone(),
                source,
            })
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, record: &AdRecord) -> SinkResult<()> {
        self.writer
            .serialize(record)
            .map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.commit()?;

        self.rows_written += 1;
        tracing::trace!("Row {} written: {}", self.rows_written, record.link);
        Ok(())
    }

    fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
