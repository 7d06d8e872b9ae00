//! Scanner module for file enumeration and content hashing.
//!
//! This module provides functionality for:
//! - The [`FileHandle`] abstraction the classifier works on
//! - Sorted directory walking using jwalk
//! - Streaming SHA-256 content digests
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{FileHandle, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.display_path(), file.size()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{hash_to_hex, Hash, Hasher};
pub use walker::Walker;

/// A selected file as seen by the classifier.
///
/// Implementors expose a display path, a byte size and a way to read the
/// full content. The classifier never mutates a handle and never keeps one
/// beyond the scan it was passed to.
pub trait FileHandle {
    /// Folder-relative path shown to the user, `/`-separated.
    fn display_path(&self) -> &str;

    /// The final component of the display path.
    fn name(&self) -> &str {
        let path = self.display_path();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Size of the content in bytes.
    fn size(&self) -> u64;

    /// Open a reader over the complete content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the content is no longer accessible.
    fn open(&self) -> Result<Box<dyn Read + '_>, HashError>;
}

/// A file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path used to open the file
    pub path: PathBuf,
    /// Path relative to the scanned folder, prefixed with the folder's name
    pub display_path: String,
    /// File name (last path component)
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry whose display path is the full path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        let display_path = path.to_string_lossy().replace('\\', "/");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| display_path.clone());
        Self {
            path,
            display_path,
            name,
            size,
        }
    }

    /// Replace the display path (the name is left untouched).
    #[must_use]
    pub fn with_display_path(mut self, display_path: impl Into<String>) -> Self {
        self.display_path = display_path.into();
        self
    }
}

impl FileHandle for FileEntry {
    fn display_path(&self) -> &str {
        &self.display_path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn open(&self) -> Result<Box<dyn Read + '_>, HashError> {
        let file = File::open(&self.path).map_err(|e| HashError::from_io(&self.path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// A file whose content is held in memory.
///
/// Useful for callers that already have the bytes (uploads, archives)
/// and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    display_path: String,
    content: Vec<u8>,
}

impl MemoryFile {
    /// Create an in-memory file.
    #[must_use]
    pub fn new(display_path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            display_path: display_path.into(),
            content: content.into(),
        }
    }

    /// The file's bytes.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl FileHandle for MemoryFile {
    fn display_path(&self) -> &str {
        &self.display_path
    }

    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    fn open(&self) -> Result<Box<dyn Read + '_>, HashError> {
        Ok(Box::new(self.content.as_slice()))
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    /// These are applied in addition to the root `.gitignore`, if any.
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new walker configuration.
    #[must_use]
    pub fn new(skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while reading file content for hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (deleted or moved since it was selected).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}
