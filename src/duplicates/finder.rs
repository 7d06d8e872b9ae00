//! Duplicate classifier.
//!
//! # Overview
//!
//! The [`Classifier`] runs a single pigeonhole pass over an ordered list of
//! [`FileHandle`]s:
//!
//! 1. Derive each file's [`GroupKey`](super::GroupKey) with the key function
//!    selected by the [`Criterion`]
//! 2. Append the file to that key's bucket and write a trace line
//! 3. Keep buckets with two or more members
//!
//! Name and size keys are cheap and run straight through. Content keys read
//! every byte, so the hashing loop reports fractional progress and reaches a
//! checkpoint every `yield_every` files, where it honours cancellation and
//! yields the thread before carrying on.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{Classifier, Criterion};
//! use dupescan::scanner::MemoryFile;
//! use dupescan::trace::ScanTrace;
//!
//! let files = vec![
//!     MemoryFile::new("a/hello.txt", "hello"),
//!     MemoryFile::new("b/hello.txt", "hello"),
//!     MemoryFile::new("c/world.txt", "world"),
//! ];
//!
//! let mut trace = ScanTrace::default();
//! let results = Classifier::with_defaults()
//!     .classify(&files, Criterion::ByContentHash, &mut trace)
//!     .unwrap();
//!
//! assert_eq!(results.len(), 1);
//! assert_eq!(results.unique_keys, 2);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::groups::{Criterion, GroupKey, GroupMap, ResultSet};
use crate::progress::{ProgressCallback, ScanProgress};
use crate::scanner::{hash_to_hex, FileHandle, HashError, Hasher};
use crate::trace::{ScanTrace, TraceSink};

/// Files hashed between two checkpoints.
pub const DEFAULT_YIELD_EVERY: usize = 25;

/// Configuration for the classifier.
#[derive(Clone)]
pub struct ClassifierConfig {
    /// Files processed between checkpoints during content scans.
    pub yield_every: usize,
    /// Optional shutdown flag, checked at every checkpoint.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Optional receiver for trace lines as they are written.
    pub trace_sink: Option<Arc<dyn TraceSink>>,
    /// Optional shared progress fraction.
    pub progress: Option<Arc<ScanProgress>>,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("yield_every", &self.yield_every)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("trace_sink", &self.trace_sink.as_ref().map(|_| "<sink>"))
            .field("progress", &self.progress)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            yield_every: DEFAULT_YIELD_EVERY,
            shutdown_flag: None,
            progress_callback: None,
            trace_sink: None,
            progress: None,
        }
    }
}

impl ClassifierConfig {
    /// Set the checkpoint interval (at least 1).
    #[must_use]
    pub fn with_yield_every(mut self, files: usize) -> Self {
        self.yield_every = files.max(1);
        self
    }

    /// Set the shutdown flag for cancellation.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// Share a progress fraction with the caller.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ScanProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Total number of files classified
    pub total_files: usize,
    /// Total size of all classified files in bytes
    pub total_size: u64,
    /// Number of distinct keys among the files
    pub unique_keys: usize,
    /// Number of groups with two or more files
    pub duplicate_groups: usize,
    /// Files beyond the first in each group
    pub duplicate_files: usize,
    /// Duration of the scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Summarize a result set.
    #[must_use]
    pub fn from_results<F>(results: &ResultSet<F>, scan_duration: Duration) -> Self {
        Self {
            total_files: results.total_files,
            total_size: results.total_size,
            unique_keys: results.unique_keys,
            duplicate_groups: results.len(),
            duplicate_files: results.duplicate_files(),
            scan_duration,
        }
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that abort a classification.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// A file's content could not be read during a content scan.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Display path of the file
        path: String,
        /// The underlying read error
        #[source]
        source: HashError,
    },

    /// The scan was cancelled at a checkpoint.
    #[error("Scan cancelled")]
    Cancelled,
}

/// Pigeonhole classifier over file handles.
#[derive(Debug, Default)]
pub struct Classifier {
    config: ClassifierConfig,
    hasher: Hasher,
}

impl Classifier {
    /// Create a new classifier with the given configuration.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new classifier with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ClassifierConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify `files` by `criterion`, writing decisions to `trace`.
    ///
    /// Returns the groups with two or more members. Every input file lands
    /// in exactly one bucket; the relative order of files and of keys is
    /// that of the input.
    ///
    /// # Errors
    ///
    /// - [`ClassifyError::Read`] if a content scan cannot read a file
    /// - [`ClassifyError::Cancelled`] if the shutdown flag is seen at a
    ///   checkpoint
    ///
    /// Either way no result is produced; the trace keeps what was written.
    pub fn classify<F: FileHandle + Clone>(
        &self,
        files: &[F],
        criterion: Criterion,
        trace: &mut ScanTrace,
    ) -> Result<ResultSet<F>, ClassifyError> {
        let total = files.len();
        let sink = self.config.trace_sink.as_deref();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(criterion.as_str(), total);
        }
        log::debug!("Classifying {} files by {}", total, criterion);

        let buckets = match criterion {
            Criterion::ByName => self.bucket(files, criterion, trace, |i, file, trace| {
                let key = file.name().to_string();
                trace.emit(
                    sink,
                    format!(
                        "[name] [{i}/{total}] pigeonhole key = \"{key}\" <= {}",
                        file.display_path()
                    ),
                );
                Ok(key)
            }),
            Criterion::BySize => self.bucket(files, criterion, trace, |i, file, trace| {
                let size = file.size();
                let key = size.to_string();
                trace.emit(
                    sink,
                    format!(
                        "[size] [{i}/{total}] size={size} bytes -> key \"{key}\" <= {}",
                        file.display_path()
                    ),
                );
                Ok(key)
            }),
            Criterion::ByContentHash => self.bucket(files, criterion, trace, |i, file, trace| {
                let path = file.display_path();
                trace.emit(sink, format!("[hash] [{i}/{total}] hashing {path} (SHA-256)"));
                let digest = self.hasher.digest(file).map_err(|source| {
                    log::warn!("Failed to hash {}: {}", path, source);
                    trace.emit(sink, format!("[hash] read failed for {path}: {source}"));
                    ClassifyError::Read {
                        path: path.to_string(),
                        source,
                    }
                })?;
                let key = hash_to_hex(&digest);
                trace.emit(sink, format!("[hash] → {path} digest={key}"));
                Ok(key)
            }),
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(criterion.as_str());
        }
        let buckets = buckets?;

        let unique_keys = buckets.unique_keys();
        match criterion {
            Criterion::ByContentHash => trace.emit(
                sink,
                format!("[hash] hashing complete. Unique digests: {unique_keys}"),
            ),
            _ => trace.emit(
                sink,
                format!("[{criterion}] grouping complete. Unique keys: {unique_keys}"),
            ),
        }

        if let Some(ref progress) = self.config.progress {
            progress.complete();
        }

        let results = ResultSet {
            criterion,
            groups: buckets.into_duplicate_groups(),
            total_files: total,
            total_size: files.iter().map(FileHandle::size).sum(),
            unique_keys,
        };
        log::info!(
            "Found {} duplicate groups among {} files ({} unique keys)",
            results.len(),
            total,
            unique_keys
        );
        Ok(results)
    }

    /// Bucket every file under the key produced by `key_fn`.
    ///
    /// `key_fn` receives the 1-based index, the file and the trace.
    fn bucket<'a, F, K>(
        &self,
        files: &'a [F],
        criterion: Criterion,
        trace: &mut ScanTrace,
        mut key_fn: K,
    ) -> Result<GroupMap<'a, F>, ClassifyError>
    where
        F: FileHandle,
        K: FnMut(usize, &F, &mut ScanTrace) -> Result<GroupKey, ClassifyError>,
    {
        let total = files.len();
        let checkpoints = criterion.reads_content();
        let mut map = GroupMap::new();

        if checkpoints {
            self.checkpoint(0, total, trace)?;
        }

        for (idx, file) in files.iter().enumerate() {
            let done = idx + 1;
            let key = key_fn(done, file, trace)?;
            map.insert(key, file);

            if checkpoints {
                if let Some(ref progress) = self.config.progress {
                    progress.advance(done, total);
                }
            }
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(done, file.display_path());
            }

            if checkpoints {
                if done % self.config.yield_every == 0 && done < total {
                    self.checkpoint(done, total, trace)?;
                }
            }
        }

        Ok(map)
    }

    /// Suspension point of the hashing loop.
    fn checkpoint(
        &self,
        done: usize,
        total: usize,
        trace: &mut ScanTrace,
    ) -> Result<(), ClassifyError> {
        if self.config.is_shutdown_requested() {
            log::info!("Scan cancelled after {}/{} files", done, total);
            trace.emit(
                self.config.trace_sink.as_deref(),
                format!("[hash] scan cancelled after {done}/{total} files"),
            );
            return Err(ClassifyError::Cancelled);
        }
        log::trace!("Checkpoint at {}/{} files", done, total);
        std::thread::yield_now();
        Ok(())
    }
}
