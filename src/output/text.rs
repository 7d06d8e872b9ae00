//! Human-readable report.
//!
//! ```text
//! Duplicate groups: 1
//!
//! Group 1
//!   photos/a.jpg (12.3 KB)
//!   backup/a.jpg (12.3 KB)
//!
//! Scanned 3 files (36.9 KiB) by hash in 4ms: 1 group, 1 extra copy
//! ```

use std::io::{self, Write};

use yansi::{Condition, Paint};

use crate::duplicates::{ResultSet, ScanSummary};
use crate::scanner::FileHandle;

/// Message printed when files were scanned but none matched.
pub const NO_DUPLICATES_MESSAGE: &str =
    "No duplicate files found based on the selected criterion.";

/// Size in kilobytes with one decimal, e.g. `1.5 KB` for 1536 bytes.
#[must_use]
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Text renderer.
pub struct TextOutput<'a, F> {
    results: &'a ResultSet<F>,
    summary: &'a ScanSummary,
    color: bool,
}

impl<'a, F: FileHandle> TextOutput<'a, F> {
    /// Create a renderer; colour is on by default.
    #[must_use]
    pub fn new(results: &'a ResultSet<F>, summary: &'a ScanSummary) -> Self {
        Self {
            results,
            summary,
            color: true,
        }
    }

    /// Enable or disable ANSI colours.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Header line above the groups.
    #[must_use]
    pub fn header(&self) -> String {
        if self.results.is_empty() {
            "No duplicates yet".to_string()
        } else {
            format!("Duplicate groups: {}", self.results.len())
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let cond = if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };

        writeln!(writer, "{}", self.header().bold().whenever(cond))?;
        writeln!(writer)?;

        if self.results.is_empty() && self.results.total_files > 0 {
            writeln!(writer, "{}", NO_DUPLICATES_MESSAGE.yellow().whenever(cond))?;
        }

        for (idx, group) in self.results.iter().enumerate() {
            writeln!(writer, "{}", format!("Group {}", idx + 1).cyan().bold().whenever(cond))?;
            for file in &group.files {
                writeln!(
                    writer,
                    "  {} {}",
                    file.display_path(),
                    format!("({})", format_kb(file.size())).dim().whenever(cond)
                )?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", self.summary_line().green().whenever(cond))?;
        Ok(())
    }

    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn summary_line(&self) -> String {
        let s = self.summary;
        format!(
            "Scanned {} {} ({}) by {} in {:.2?}: {} {}, {} extra {}",
            s.total_files,
            plural(s.total_files, "file", "files"),
            s.total_size_display(),
            self.results.criterion,
            s.scan_duration,
            s.duplicate_groups,
            plural(s.duplicate_groups, "group", "groups"),
            s.duplicate_files,
            plural(s.duplicate_files, "copy", "copies"),
        )
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
