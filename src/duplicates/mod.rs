//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Criteria and pigeonhole buckets ([`groups`])
//! - The single-pass classifier ([`finder`])
//! - The per-selection scan lifecycle ([`session`])

pub mod finder;
pub mod groups;
pub mod session;

pub use finder::{Classifier, ClassifierConfig, ClassifyError, ScanSummary, DEFAULT_YIELD_EVERY};
pub use groups::{Criterion, DuplicateGroup, GroupKey, GroupMap, ResultSet};
pub use session::{ScanSession, ScanStatus, SessionError};
