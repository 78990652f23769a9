//! Fingerprint grouping.
//!
//! # Overview
//!
//! Two grouping contracts live here and are deliberately separate types:
//!
//! - [`FullMapGrouper`] holds every (fingerprint, path) pair and, once the
//!   input is exhausted, returns each [`DuplicateGroup`] with **all** of its
//!   members, the first occurrence included.
//! - [`StreamingGrouper`] remembers only the first path seen for each
//!   fingerprint and reports a [`DuplicatePair`] the moment a later path
//!   matches. The first occurrence is never reported on its own.
//!
//! In both, member order is processing order. No secondary sort is applied.
//!
//! # Example
//!
//! ```
//! use fdup::duplicates::group_fingerprints;
//! use fdup::scanner::Hasher;
//! use std::path::PathBuf;
//!
//! let hasher = Hasher::new();
//! let pairs = vec![
//!     (hasher.fingerprint_bytes(b"hello"), PathBuf::from("/a/1.txt")),
//!     (hasher.fingerprint_bytes(b"hello"), PathBuf::from("/a/2.txt")),
//!     (hasher.fingerprint_bytes(b"world"), PathBuf::from("/b/3.txt")),
//! ];
//!
//! let groups = group_fingerprints(pairs);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].files, vec![PathBuf::from("/a/1.txt"), PathBuf::from("/a/2.txt")]);
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::Fingerprint;

/// Confirmed duplicate group of files.
///
/// Always holds at least two paths when produced by [`FullMapGrouper`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content fingerprint shared by every file in the group
    pub fingerprint: Fingerprint,
    /// Paths in discovery order; `files[0]` is the first occurrence
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, files: Vec<PathBuf>) -> Self {
        Self { fingerprint, files }
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

    /// The first-discovered member.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// Every member after the first.
    #[must_use]
    pub fn duplicates(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// `(first, other)` for every non-first member, in group order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, &Path)> + '_ {
        self.first()
            .into_iter()
            .flat_map(move |first| self.duplicates().iter().map(move |p| (first, p.as_path())))
    }
}

/// A later occurrence of content that was already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    /// Fingerprint both files share
    pub fingerprint: Fingerprint,
    /// The first path seen with this fingerprint
    pub original: PathBuf,
    /// The path just found to match it
    pub duplicate: PathBuf,
}

/// Two-pass grouping over the full set of fingerprints.
///
/// Keeps every pair in memory until [`into_groups`](Self::into_groups).
#[derive(Debug, Default)]
pub struct FullMapGrouper {
    index: HashMap<Fingerprint, usize>,
    buckets: Vec<(Fingerprint, Vec<PathBuf>)>,
    total_files: usize,
}

impl FullMapGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file.
    pub fn push(&mut self, fingerprint: Fingerprint, path: PathBuf) {
        self.total_files += 1;
        match self.index.entry(fingerprint) {
            Entry::Occupied(slot) => self.buckets[*slot.get()].1.push(path),
            Entry::Vacant(slot) => {
                slot.insert(self.buckets.len());
                self.buckets.push((fingerprint, vec![path]));
            }
        }
    }

    /// Number of files recorded so far.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Number of distinct fingerprints recorded so far.
    #[must_use]
    pub fn unique_fingerprints(&self) -> usize {
        self.buckets.len()
    }

    /// Drop singletons and return the remaining groups.
    ///
    /// Groups are ordered by when their first member was recorded.
    #[must_use]
    pub fn into_groups(self) -> Vec<DuplicateGroup> {
        self.buckets
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(fingerprint, files)| DuplicateGroup::new(fingerprint, files))
            .collect()
    }
}

impl Extend<(Fingerprint, PathBuf)> for FullMapGrouper {
    fn extend<T: IntoIterator<Item = (Fingerprint, PathBuf)>>(&mut self, iter: T) {
        for (fingerprint, path) in iter {
            self.push(fingerprint, path);
        }
    }
}

/// Group a complete sequence of fingerprints with the full-map contract.
#[must_use]
pub fn group_fingerprints<I>(pairs: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = (Fingerprint, PathBuf)>,
{
    let mut grouper = FullMapGrouper::new();
    grouper.extend(pairs);
    grouper.into_groups()
}

/// One-pass grouping that reports duplicates as soon as they appear.
///
/// Only the first path of each fingerprint is retained, so memory grows with
/// the number of distinct contents rather than the number of files.
#[derive(Debug, Default)]
pub struct StreamingGrouper {
    first_seen: HashMap<Fingerprint, FirstSeen>,
    duplicate_groups: usize,
}

#[derive(Debug)]
struct FirstSeen {
    path: PathBuf,
    repeated: bool,
}

impl StreamingGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file, returning a pair if its content was seen before.
    pub fn observe(&mut self, fingerprint: Fingerprint, path: PathBuf) -> Option<DuplicatePair> {
        match self.first_seen.entry(fingerprint) {
            Entry::Occupied(mut slot) => {
                let first = slot.get_mut();
                if !first.repeated {
                    first.repeated = true;
                    self.duplicate_groups += 1;
                }
                Some(DuplicatePair {
                    fingerprint,
                    original: first.path.clone(),
                    duplicate: path,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(FirstSeen {
                    path,
                    repeated: false,
                });
                None
            }
        }
    }

    /// Number of distinct fingerprints seen so far.
    #[must_use]
    pub fn unique_fingerprints(&self) -> usize {
        self.first_seen.len()
    }

    /// Number of fingerprints that have produced at least one pair.
    #[must_use]
    pub fn duplicate_groups(&self) -> usize {
        self.duplicate_groups
    }
}

/// Lazily adapt a fingerprint sequence into its duplicate pairs.
pub fn stream_duplicates<I>(pairs: I) -> impl Iterator<Item = DuplicatePair>
where
    I: IntoIterator<Item = (Fingerprint, PathBuf)>,
{
    let mut grouper = StreamingGrouper::new();
    pairs
        .into_iter()
        .filter_map(move |(fingerprint, path)| grouper.observe(fingerprint, path))
}
