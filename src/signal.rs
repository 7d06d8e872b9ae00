//! Ctrl+C handling.
//!
//! A Ctrl+C sets a shared [`AtomicBool`]. The flag is handed to the walker
//! and the classifier, which stop at their next check and report the scan
//! as cancelled; the process then exits with [`EXIT_CODE_INTERRUPTED`].
//!
//! ```rust,no_run
//! use dupescan::duplicates::ClassifierConfig;
//! use dupescan::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = ClassifierConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (128 + 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Shared cancellation flag set on Ctrl+C.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown)
    /// was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown without a signal.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to pass to the walker and classifier.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// The hook can only be registered once per process. Later calls return
/// the installed handler with its flag cleared, so `run_app` can be called
/// repeatedly (as the integration tests do).
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered
/// and no handler was installed before.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();
    let registered = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping at the next checkpoint...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    match registered {
        Ok(()) => {
            let handler = GLOBAL_HANDLER.get_or_init(|| handler);
            Ok(handler.clone())
        }
        // Another thread won the race between `get` and `set_handler`.
        Err(ctrlc::Error::MultipleHandlers) => match GLOBAL_HANDLER.get() {
            Some(handler) => {
                handler.reset();
                Ok(handler.clone())
            }
            None => {
                log::debug!("Ctrl+C handler registered elsewhere, using an unhooked flag");
                Ok(GLOBAL_HANDLER.get_or_init(ShutdownHandler::new).clone())
            }
        },
        Err(e) => Err(e.into()),
    }
}
