//! Progress reporting utilities using indicatif.
//!
//! Two pieces live here:
//!
//! - [`ScanProgress`], the fractional progress value of the current scan.
//!   It only ever moves forward while a scan runs and can be read from any
//!   thread.
//! - [`Progress`], which implements [`ProgressCallback`] to draw a terminal
//!   progress bar for content scans.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use crate::trace::TraceSink;

/// Progress callback for classification phases.
///
/// Implement this trait to receive progress updates while a scan runs.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`"name"`, `"size"` or `"hash"`)
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called after each item has been processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far (1-based)
    /// * `path` - Display path of the item just processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Fraction of the current scan that is done, in `[0, 1]`.
///
/// Stored as `f64` bits. For non-negative floats the bit patterns order the
/// same way as the values, so `fetch_max` keeps the value monotonic.
#[derive(Debug, Default)]
pub struct ScanProgress {
    bits: AtomicU64,
}

impl ScanProgress {
    /// Create a progress value at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fraction.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    /// Record that `done` of `total` items are finished.
    ///
    /// Values lower than the current one are ignored.
    pub fn advance(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let fraction = (done.min(total) as f64) / (total as f64);
        self.bits.fetch_max(fraction.to_bits(), Ordering::SeqCst);
    }

    /// Mark the scan complete.
    pub fn complete(&self) {
        self.bits.store(1.0f64.to_bits(), Ordering::SeqCst);
    }

    /// Back to 0 for a new scan.
    pub fn reset(&self) {
        self.bits.store(0.0f64.to_bits(), Ordering::SeqCst);
    }
}

/// Progress reporter using indicatif.
///
/// Draws a bar for the hashing phase only; name and size scans finish too
/// quickly to be worth one. Trace lines can be printed above the bar.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
    show_trace: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupescan::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
            show_trace: false,
        }
    }

    /// Also print every trace line (to stderr, above the bar).
    #[must_use]
    pub fn with_trace(mut self, show_trace: bool) -> Self {
        self.show_trace = show_trace;
        self
    }

    fn hash_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet || phase != "hash" {
            return;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::hash_style());
        pb.set_message("Hashing");
        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        self.with_bar(|pb| {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        });
    }

    fn on_phase_end(&self, _phase: &str) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl TraceSink for Progress {
    fn on_line(&self, line: &str) {
        if !self.show_trace {
            return;
        }
        let mut printed = false;
        self.with_bar(|pb| {
            pb.suspend(|| eprintln!("{line}"));
            printed = true;
        });
        if !printed {
            eprintln!("{line}");
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = path.rsplit('/').next().unwrap_or(path);
    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
