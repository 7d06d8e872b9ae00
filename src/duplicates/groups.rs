//! Criteria, group keys and the pigeonhole buckets.
//!
//! # Overview
//!
//! Classification puts every file into a bucket keyed by a [`GroupKey`]
//! derived from one [`Criterion`]. The [`GroupMap`] keeps keys in first-seen
//! order and members in input order; buckets with more than one member
//! become the [`DuplicateGroup`]s of a [`ResultSet`].
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::GroupMap;
//! use dupescan::scanner::{FileHandle, MemoryFile};
//!
//! let files = vec![
//!     MemoryFile::new("docs/a.txt", "x"),
//!     MemoryFile::new("docs/b.txt", "y"),
//!     MemoryFile::new("backup/a.txt", "z"),
//! ];
//!
//! let mut map = GroupMap::new();
//! for file in &files {
//!     map.insert(file.name().to_string(), file);
//! }
//! assert_eq!(map.unique_keys(), 2);
//!
//! let groups = map.into_duplicate_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].key, "a.txt");
//! ```

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::scanner::FileHandle;

/// The derived bucketing value for a file.
pub type GroupKey = String;

/// Basis for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Criterion {
    /// Same file name (last path component)
    #[serde(rename = "name")]
    #[value(name = "name")]
    ByName,
    /// Same size in bytes
    #[serde(rename = "size")]
    #[value(name = "size")]
    BySize,
    /// Same SHA-256 content digest
    #[default]
    #[serde(rename = "hash")]
    #[value(name = "hash")]
    ByContentHash,
}

impl Criterion {
    /// Short name used in trace lines and output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByName => "name",
            Self::BySize => "size",
            Self::ByContentHash => "hash",
        }
    }

    /// Whether keys can only be derived by reading file content.
    #[must_use]
    pub fn reads_content(self) -> bool {
        matches!(self, Self::ByContentHash)
    }

    /// One-line description of the method, written to the trace at scan start.
    #[must_use]
    pub fn explanation(self) -> &'static str {
        match self {
            Self::ByName => "Process: Using the pigeonhole principle by file name. Each file goes into a bucket keyed by its name; buckets with >1 file are duplicates.",
            Self::BySize => "Process: Using the pigeonhole principle by file size. Each file goes into a bucket keyed by its byte size; buckets with >1 file are potential duplicates.",
            Self::ByContentHash => "Process: Computing SHA-256 for each file (content-based). Files with the same digest are true duplicates.",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets of files keyed by [`GroupKey`].
///
/// Key iteration follows first-seen order; members keep insertion order.
/// A key only exists once a file has been inserted under it, so no bucket
/// is ever empty.
#[derive(Debug)]
pub struct GroupMap<'a, F> {
    index: HashMap<GroupKey, usize>,
    buckets: Vec<(GroupKey, Vec<&'a F>)>,
}

impl<F> Default for GroupMap<'_, F> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }
}

impl<'a, F> GroupMap<'a, F> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file to the bucket for `key`, creating it if needed.
    pub fn insert(&mut self, key: GroupKey, file: &'a F) {
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(file),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![file]));
            }
        }
    }

    /// Members under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[&'a F]> {
        self.index
            .get(key)
            .map(|&slot| self.buckets[slot].1.as_slice())
    }

    /// Number of distinct keys seen.
    #[must_use]
    pub fn unique_keys(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a F])> {
        self.buckets
            .iter()
            .map(|(key, files)| (key.as_str(), files.as_slice()))
    }
}

impl<F: Clone> GroupMap<'_, F> {
    /// Keep only buckets with two or more members, cloning their handles.
    #[must_use]
    pub fn into_duplicate_groups(self) -> Vec<DuplicateGroup<F>> {
        self.buckets
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(key, files)| DuplicateGroup::new(key, files.into_iter().cloned().collect()))
            .collect()
    }
}

/// Files that share a group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup<F> {
    /// The shared key
    pub key: GroupKey,
    /// Members in input order
    pub files: Vec<F>,
}

impl<F> DuplicateGroup<F> {
    /// Create a new group.
    #[must_use]
    pub fn new(key: GroupKey, files: Vec<F>) -> Self {
        Self { key, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<F: FileHandle> DuplicateGroup<F> {
    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(FileHandle::size).sum()
    }

    /// Display paths of the members.
    #[must_use]
    pub fn display_paths(&self) -> Vec<&str> {
        self.files.iter().map(FileHandle::display_path).collect()
    }
}

/// The outcome of one successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<F> {
    /// Criterion the files were classified by
    pub criterion: Criterion,
    /// Groups with two or more members, in first-seen key order
    pub groups: Vec<DuplicateGroup<F>>,
    /// Number of input files
    pub total_files: usize,
    /// Combined size of the input files
    pub total_size: u64,
    /// Number of distinct keys among the input
    pub unique_keys: usize,
}

impl<F> ResultSet<F> {
    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DuplicateGroup<F>> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Files beyond the first in each group.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.len().saturating_sub(1)).sum()
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateGroup<F>> {
        self.groups.iter()
    }
}

impl<'r, F> IntoIterator for &'r ResultSet<F> {
    type Item = &'r DuplicateGroup<F>;
    type IntoIter = std::slice::Iter<'r, DuplicateGroup<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
