//! Scan lifecycle for one selection of files.
//!
//! A [`ScanSession`] owns the selected handles together with the outcome of
//! the most recent scan: its status, result set, trace and progress.
//!
//! ```text
//! Idle ──scan──▶ Running ──▶ Completed | Failed | Cancelled
//!  ▲                                   │
//!  └──────────────select───────────────┘
//! ```
//!
//! At most one scan runs at a time. [`ScanSession::scan`] takes `&self`, so
//! the session can be shared between threads; a second call while a scan is
//! in flight fails with [`SessionError::Busy`]. Status, progress and the
//! last finished scan's trace stay readable throughout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::finder::{Classifier, ClassifierConfig, ClassifyError};
use super::groups::{Criterion, ResultSet};
use crate::progress::ScanProgress;
use crate::scanner::FileHandle;
use crate::trace::{ScanTrace, DEFAULT_TRACE_CAPACITY, DEFAULT_TRACE_THRESHOLD};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    /// No scan has run since the last selection.
    #[default]
    Idle,
    /// A scan is in flight.
    Running,
    /// The last scan produced a result set.
    Completed,
    /// The last scan aborted on a read error.
    Failed,
    /// The last scan was cancelled.
    Cancelled,
}

impl ScanStatus {
    /// Whether this is the outcome of a finished scan.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Errors returned by [`ScanSession::scan`].
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// Another scan on this session has not finished yet.
    #[error("A scan is already in progress")]
    Busy,

    /// The scan itself failed or was cancelled.
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl SessionError {
    /// Whether the error is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Classify(ClassifyError::Cancelled))
    }
}

#[derive(Debug)]
struct SessionState<F> {
    status: ScanStatus,
    results: Option<ResultSet<F>>,
    trace: ScanTrace,
    last_error: Option<String>,
    last_duration: Option<Duration>,
}

/// Releases the re-entrancy flag when a scan ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A selection of files and the outcome of its latest scan.
pub struct ScanSession<F> {
    files: Vec<F>,
    classifier: Classifier,
    cancel: Arc<AtomicBool>,
    progress: Arc<ScanProgress>,
    running: AtomicBool,
    trace_capacity: usize,
    trace_threshold: usize,
    state: Mutex<SessionState<F>>,
}

impl<F> std::fmt::Debug for ScanSession<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("files", &self.files.len())
            .field("classifier", &self.classifier)
            .field("running", &self.running)
            .field("progress", &self.progress.fraction())
            .finish_non_exhaustive()
    }
}

impl<F> ScanSession<F> {
    /// Create an idle session with no files selected.
    ///
    /// The session shares `config.shutdown_flag` as its cancellation flag
    /// when one is set, and creates its own otherwise.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        let cancel = config
            .shutdown_flag
            .clone()
            .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));
        let progress = Arc::new(ScanProgress::new());
        let config = config
            .with_shutdown_flag(cancel.clone())
            .with_progress(progress.clone());

        Self {
            files: Vec::new(),
            classifier: Classifier::new(config),
            cancel,
            progress,
            running: AtomicBool::new(false),
            trace_capacity: DEFAULT_TRACE_CAPACITY,
            trace_threshold: DEFAULT_TRACE_THRESHOLD,
            state: Mutex::new(SessionState {
                status: ScanStatus::Idle,
                results: None,
                trace: ScanTrace::default(),
                last_error: None,
                last_duration: None,
            }),
        }
    }

    /// Set the trace retention window.
    #[must_use]
    pub fn with_trace_limits(mut self, capacity: usize, threshold: usize) -> Self {
        self.trace_capacity = capacity;
        self.trace_threshold = threshold;
        self.lock_state().trace = ScanTrace::new(capacity, threshold);
        self
    }

    /// Replace the selection, discarding the previous result, trace and
    /// progress.
    pub fn select(&mut self, files: Vec<F>) {
        log::debug!("Selected {} files", files.len());
        self.files = files;
        self.cancel.store(false, Ordering::SeqCst);
        self.progress.reset();

        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        state.status = ScanStatus::Idle;
        state.results = None;
        state.trace.clear();
        state.last_error = None;
        state.last_duration = None;
    }

    /// The selected files, in selection order.
    #[must_use]
    pub fn files(&self) -> &[F] {
        &self.files
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> ScanStatus {
        self.lock_state().status
    }

    /// Whether a scan is in flight.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fraction of the current or last scan that is done.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress.fraction()
    }

    /// Shared handle to the progress value.
    #[must_use]
    pub fn progress_handle(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Ask the running scan to stop at its next checkpoint.
    pub fn cancel(&self) {
        log::debug!("Cancellation requested");
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// The cancellation flag shared with the classifier.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Trace of the last finished scan.
    #[must_use]
    pub fn trace(&self) -> ScanTrace {
        self.lock_state().trace.clone()
    }

    /// Trace of the last finished scan as plain text.
    #[must_use]
    pub fn trace_text(&self) -> String {
        self.lock_state().trace.to_text()
    }

    /// Message of the error that ended the last scan, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Wall time of the last finished scan.
    #[must_use]
    pub fn last_duration(&self) -> Option<Duration> {
        self.lock_state().last_duration
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState<F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: FileHandle + Clone> ScanSession<F> {
    /// Result set of the last completed scan.
    #[must_use]
    pub fn results(&self) -> Option<ResultSet<F>> {
        self.lock_state().results.clone()
    }

    /// Classify the selected files by `criterion`.
    ///
    /// Returns `Ok(None)` without touching any state when nothing is
    /// selected. Otherwise the previous result is dropped at once and the
    /// previous trace is replaced by this scan's when it finishes. A
    /// cancellation ends this scan only; the flag is cleared afterwards.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Busy`] if a scan is already running
    /// - [`SessionError::Classify`] if the scan failed or was cancelled;
    ///   the trace written so far is kept
    pub fn scan(&self, criterion: Criterion) -> Result<Option<ResultSet<F>>, SessionError> {
        if self.files.is_empty() {
            log::info!("No files selected, nothing to scan");
            return Ok(None);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("Rejected scan request: a scan is already running");
            return Err(SessionError::Busy);
        }
        let _running = RunningGuard(&self.running);

        let started = Instant::now();
        {
            let mut state = self.lock_state();
            state.status = ScanStatus::Running;
            state.results = None;
            state.last_error = None;
            state.last_duration = None;
        }
        self.progress.reset();

        // The previous trace stays in state until this scan finishes.
        let mut trace = ScanTrace::new(self.trace_capacity, self.trace_threshold);

        let sink = self.classifier.config().trace_sink.as_deref();
        trace.emit(sink, format!("=== Scan started ({}) ===", timestamp()));
        trace.emit(sink, format!("Selected criterion: {criterion}"));
        trace.emit(sink, criterion.explanation());

        let outcome = self.classifier.classify(&self.files, criterion, &mut trace);

        trace.emit(sink, format!("=== Scan finished ({}) ===", timestamp()));
        let elapsed = started.elapsed();

        let mut state = self.lock_state();
        state.trace = trace;
        state.last_duration = Some(elapsed);
        match outcome {
            Ok(results) => {
                log::info!(
                    "Scan by {} completed in {:.2?}: {} duplicate groups",
                    criterion,
                    elapsed,
                    results.len()
                );
                state.status = ScanStatus::Completed;
                state.results = Some(results.clone());
                Ok(Some(results))
            }
            Err(err) => {
                state.status = match err {
                    ClassifyError::Cancelled => {
                        // Consumed; the next scan starts uncancelled.
                        self.cancel.store(false, Ordering::SeqCst);
                        ScanStatus::Cancelled
                    }
                    ClassifyError::Read { .. } => ScanStatus::Failed,
                };
                log::warn!("Scan by {} ended {}: {}", criterion, state.status, err);
                state.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
