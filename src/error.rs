//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::{ClassifyError, SessionError};

/// Process exit codes.
///
/// - 0: scan completed, duplicates found
/// - 1: general error, including a scan that failed on a read error
/// - 2: scan completed, no duplicates
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found.
    Success = 0,
    /// An error occurred.
    GeneralError = 1,
    /// No duplicates were found.
    NoDuplicates = 2,
    /// Interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::Interrupted => "DS130",
        }
    }

    /// Snake-case name, as used in JSON output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::GeneralError => "general_error",
            Self::NoDuplicates => "no_duplicates",
            Self::Interrupted => "interrupted",
        }
    }

    /// Exit code for a completed scan.
    #[must_use]
    pub fn for_groups(groups: usize) -> Self {
        if groups == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }

    /// Exit code for an error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let cancelled = err
            .downcast_ref::<SessionError>()
            .is_some_and(SessionError::is_cancelled)
            || err
                .downcast_ref::<ClassifyError>()
                .is_some_and(|e| matches!(e, ClassifyError::Cancelled));
        if cancelled {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
