//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! The [`Hasher`] reads a [`FileHandle`]'s content in fixed-size chunks and
//! feeds it to SHA-256, so memory use does not depend on file size. Digests
//! are rendered as lowercase hex, two digits per byte, which is the group
//! key format for content scans.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use super::{FileHandle, HashError};

/// A SHA-256 digest.
pub type Hash = [u8; 32];

/// Default read buffer size (64 KiB).
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Streaming SHA-256 hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (at least 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Compute the digest of a handle's complete content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the handle cannot be opened or a read fails.
    pub fn digest<F: FileHandle + ?Sized>(&self, file: &F) -> Result<Hash, HashError> {
        let reader = file.open()?;
        self.digest_reader(reader)
            .map_err(|e| HashError::from_io(&PathBuf::from(file.display_path()), e))
    }

    /// Compute the digest of everything a reader yields.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error other than `Interrupted`.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> std::io::Result<Hash> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }
        Ok(hasher.finalize().into())
    }

    /// Compute the digest of an in-memory byte slice.
    #[must_use]
    pub fn digest_bytes(&self, bytes: &[u8]) -> Hash {
        Sha256::digest(bytes).into()
    }
}

/// Render a digest as lowercase hex (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
