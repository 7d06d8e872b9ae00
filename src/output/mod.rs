//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text for people at a terminal
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{Classifier, Criterion, ScanSummary};
//! use dupescan::error::ExitCode;
//! use dupescan::output::JsonOutput;
//! use dupescan::scanner::MemoryFile;
//! use dupescan::trace::ScanTrace;
//! use std::time::Duration;
//!
//! let files = vec![MemoryFile::new("a.txt", "x"), MemoryFile::new("b/a.txt", "y")];
//! let results = Classifier::with_defaults()
//!     .classify(&files, Criterion::ByName, &mut ScanTrace::default())
//!     .unwrap();
//! let summary = ScanSummary::from_results(&results, Duration::ZERO);
//!
//! let output = JsonOutput::new(&results, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use self::csv::CsvOutput;
pub use json::JsonOutput;
pub use text::{format_kb, TextOutput};
