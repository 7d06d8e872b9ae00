//! Bounded, ordered diagnostic log of a scan.
//!
//! Every decision the classifier makes is appended here as a human-readable
//! line. Retention is bounded: once the trace grows past a threshold it is
//! truncated to the most recent lines, so very large scans keep a fixed
//! memory footprint. Eviction never affects classification.
//!
//! Lines are also mirrored to the `log` facade at debug level under the
//! `dupescan::trace` target.

use std::collections::VecDeque;

/// Lines kept after a truncation.
pub const DEFAULT_TRACE_CAPACITY: usize = 1500;

/// Length that triggers a truncation.
pub const DEFAULT_TRACE_THRESHOLD: usize = 2000;

/// Receives trace lines as they are produced.
pub trait TraceSink: Send + Sync {
    /// Called once per appended line.
    fn on_line(&self, line: &str);
}

/// Append-only trace with bounded retention.
#[derive(Debug, Clone)]
pub struct ScanTrace {
    lines: VecDeque<String>,
    capacity: usize,
    threshold: usize,
    evicted: usize,
}

impl Default for ScanTrace {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY, DEFAULT_TRACE_THRESHOLD)
    }
}

impl ScanTrace {
    /// Create a trace that keeps the last `capacity` lines once it holds
    /// more than `threshold`. The threshold is raised to the capacity if
    /// it is smaller.
    #[must_use]
    pub fn new(capacity: usize, threshold: usize) -> Self {
        let capacity = capacity.max(1);
        let threshold = threshold.max(capacity);
        Self {
            lines: VecDeque::with_capacity(threshold.min(4096) + 1),
            capacity,
            threshold,
            evicted: 0,
        }
    }

    /// Append a line, truncating old lines first if over the threshold.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::debug!(target: crate::logging::TRACE_TARGET, "{}", line);

        if self.lines.len() > self.threshold {
            let excess = self.lines.len() - self.capacity;
            self.lines.drain(..excess);
            self.evicted += excess;
        }
        self.lines.push_back(line);
    }

    /// Append a line and forward it to a sink.
    pub fn emit(&mut self, sink: Option<&dyn TraceSink>, line: impl Into<String>) {
        let line = line.into();
        if let Some(sink) = sink {
            sink.on_line(&line);
        }
        self.push(line);
    }

    /// Drop every retained line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.evicted = 0;
    }

    /// Retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Most recent line.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Number of retained lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines dropped by truncation since the last clear.
    #[must_use]
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    /// Plain-text export: retained lines joined with `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
