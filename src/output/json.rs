//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "criterion": "hash",
//!   "duplicates": [
//!     {
//!       "key": "2cf24dba...",
//!       "files": [
//!         { "path": "docs/a.txt", "size": 5 },
//!         { "path": "backup/a.txt", "size": 5 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "total_size": 15,
//!     "unique_keys": 2,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "scan_duration_ms": 2,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{Criterion, DuplicateGroup, ResultSet, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::FileHandle;

/// One member of a group.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonFile {
    /// Display path
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Shared key: file name, decimal size or hex digest
    pub key: String,
    /// Members in input order
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group<F: FileHandle>(group: &DuplicateGroup<F>) -> Self {
        Self {
            key: group.key.clone(),
            files: group
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.display_path().to_string(),
                    size: f.size(),
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files classified
    pub total_files: usize,
    /// Total size of all classified files in bytes
    pub total_size: u64,
    /// Number of distinct keys
    pub unique_keys: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files beyond the first in each group
    pub duplicate_files: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            unique_keys: summary.unique_keys,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Criterion the files were grouped by
    pub criterion: Criterion,
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a result set, summary and exit code.
    #[must_use]
    pub fn new<F: FileHandle>(
        results: &ResultSet<F>,
        summary: &ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            criterion: results.criterion,
            duplicates: results
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)
    }
}
