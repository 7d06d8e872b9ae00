//! CSV output formatter for duplicate scan results.
//!
//! One row is generated for each member of each duplicate group. The header
//! is always written, even when there are no groups.
//!
//! # Columns
//!
//! - `group`: 1-based group number
//! - `key`: shared key (file name, decimal size or hex digest)
//! - `path`: display path of the file
//! - `size_bytes`: file size in bytes

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::ResultSet;
use crate::scanner::FileHandle;

/// Column names, in order.
pub const CSV_HEADER: [&str; 4] = ["group", "key", "path", "size_bytes"];

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group: usize,
    key: &'a str,
    path: &'a str,
    size_bytes: u64,
}

/// CSV output formatter.
pub struct CsvOutput<'a, F> {
    results: &'a ResultSet<F>,
}

impl<'a, F: FileHandle> CsvOutput<'a, F> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(results: &'a ResultSet<F>) -> Self {
        Self { results }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(CSV_HEADER)?;

        for (idx, group) in self.results.iter().enumerate() {
            for file in &group.files {
                csv_writer.serialize(CsvRow {
                    group: idx + 1,
                    key: &group.key,
                    path: file.display_path(),
                    size_bytes: file.size(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
