//! Duplicate finder orchestrating the scan pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] wires the three stages together:
//! 1. **Enumerate**: [`Walker`] yields absolute file paths
//! 2. **Fingerprint**: [`Hasher`] digests each file's full content
//! 3. **Group**: [`FullMapGrouper`] or [`StreamingGrouper`] collects matches
//!
//! By default files are fingerprinted one at a time on the calling thread and
//! the first unreadable file aborts the scan. [`FinderConfig::io_threads`]
//! enables parallel fingerprinting and [`FinderConfig::strict`] = `false`
//! switches to skip-and-warn.
//!
//! # Example
//!
//! ```no_run
//! use fdup::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &groups {
//!     println!("{}: {} copies", group.fingerprint, group.len());
//! }
//! println!("{} files scanned", summary.total_files);
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{DuplicateGroup, DuplicatePair, FullMapGrouper, StreamingGrouper};
use crate::scanner::{Fingerprint, Hasher, ScanError, Walker, WalkerConfig, DEFAULT_BUFFER_SIZE};

/// Configuration for a duplicate scan.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Number of threads used to fingerprint files.
    /// Default is 1: files are read strictly one after another.
    pub io_threads: usize,
    /// Abort on the first walk or read error (default). When `false`,
    /// failing files are logged, counted and skipped.
    pub strict: bool,
    /// Read buffer size for the hasher.
    pub buffer_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            strict: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            walker_config: WalkerConfig::default(),
        }
    }
}

impl FinderConfig {
    /// Set the number of fingerprinting threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Fail-fast on any error during scan.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the hasher read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }
}

/// Summary of a completed scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Files successfully fingerprinted
    pub total_files: usize,
    /// Distinct fingerprints among those files
    pub unique_fingerprints: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Files or directories skipped because of errors (non-strict mode)
    pub skipped_files: usize,
    /// Errors encountered and skipped during the scan
    pub errors: Vec<ScanError>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether any entry had to be skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.skipped_files > 0
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The fingerprinting thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A walk or read error aborted the scan.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl FinderError {
    /// Whether this error means the root could not be scanned at all.
    #[must_use]
    pub fn is_invalid_root(&self) -> bool {
        matches!(self, Self::PathNotFound(_) | Self::NotADirectory(_))
    }
}

type Fingerprinted = Result<(Fingerprint, PathBuf), ScanError>;

/// Main duplicate finder.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::with_buffer_size(config.buffer_size);
        Self { config, hasher }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan `root` and return every duplicate group with all its members.
    ///
    /// Groups are ordered by the discovery of their first member and members
    /// by discovery order.
    ///
    /// # Errors
    ///
    /// - [`FinderError::PathNotFound`] / [`FinderError::NotADirectory`] if
    ///   `root` cannot be scanned; nothing is read in that case.
    /// - [`FinderError::Scan`] for the first walk or read error in strict mode.
    pub fn find_duplicates(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        validate_root(root)?;

        let walker = Walker::new(root, self.config.walker_config.clone());
        log::info!("Starting duplicate scan of {}", walker.root().display());

        let mut summary = ScanSummary::default();
        let mut grouper = FullMapGrouper::new();

        for result in self.fingerprinted(&walker)? {
            match result {
                Ok((fingerprint, path)) => grouper.push(fingerprint, path),
                Err(e) => self.handle_error(e, &mut summary)?,
            }
        }

        summary.total_files = grouper.total_files();
        summary.unique_fingerprints = grouper.unique_fingerprints();

        let groups = grouper.into_groups();
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} duplicate files, {} skipped in {:.2?}",
            summary.total_files,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.skipped_files,
            summary.scan_duration
        );

        Ok((groups, summary))
    }

    /// Scan `root` lazily, yielding each duplicate as soon as it is found.
    ///
    /// The first occurrence of any content is never yielded. Files are always
    /// fingerprinted sequentially, regardless of `io_threads`.
    ///
    /// # Errors
    ///
    /// Fails up front only for an invalid root; read errors surface as
    /// stream items (strict mode) or are skipped.
    pub fn stream_duplicates(&self, root: &Path) -> Result<DuplicateStream, FinderError> {
        validate_root(root)?;

        let walker = Walker::new(root, self.config.walker_config.clone());
        log::info!("Starting streaming scan of {}", walker.root().display());

        let hasher = self.hasher.clone();
        let inner = walker.walk().map(move |entry| -> Fingerprinted {
            let path = entry?;
            let fingerprint = hasher.fingerprint(&path)?;
            Ok((fingerprint, path))
        });

        Ok(DuplicateStream {
            inner: Box::new(inner),
            grouper: StreamingGrouper::new(),
            strict: self.config.strict,
            summary: ScanSummary::default(),
            start_time: Instant::now(),
            failed: false,
        })
    }

    /// Fingerprint every walked file, in walk order.
    ///
    /// In strict mode with several threads the first error is returned
    /// directly, and workers stop picking up new files once it is seen.
    fn fingerprinted<'a>(
        &'a self,
        walker: &Walker,
    ) -> Result<Box<dyn Iterator<Item = Fingerprinted> + 'a>, FinderError> {
        if self.config.io_threads <= 1 {
            let iter = walker.walk().map(move |entry| self.fingerprint_entry(entry));
            return Ok(Box::new(iter));
        }

        let entries: Vec<Result<PathBuf, ScanError>> = walker.walk().collect();
        log::info!(
            "Fingerprinting {} entries on {} threads",
            entries.len(),
            self.config.io_threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()?;

        // Indexed collects keep enumeration order.
        if self.config.strict {
            let results: Result<Vec<(Fingerprint, PathBuf)>, ScanError> = pool.install(|| {
                entries
                    .into_par_iter()
                    .map(|entry| self.fingerprint_entry(entry))
                    .collect()
            });
            let results = results.map_err(|e| {
                log::debug!("Aborting scan: {}", e);
                FinderError::Scan(e)
            })?;
            return Ok(Box::new(results.into_iter().map(Ok::<_, ScanError>)));
        }

        let results: Vec<Fingerprinted> = pool.install(|| {
            entries
                .into_par_iter()
                .map(|entry| self.fingerprint_entry(entry))
                .collect()
        });

        Ok(Box::new(results.into_iter()))
    }

    fn fingerprint_entry(&self, entry: Result<PathBuf, ScanError>) -> Fingerprinted {
        let path = entry?;
        let fingerprint = self.hasher.fingerprint(&path)?;
        Ok((fingerprint, path))
    }

    fn handle_error(&self, error: ScanError, summary: &mut ScanSummary) -> Result<(), FinderError> {
        if self.config.strict {
            log::debug!("Aborting scan: {}", error);
            return Err(FinderError::Scan(error));
        }
        log::warn!("Skipping {}: {}", error.path().display(), error);
        summary.skipped_files += 1;
        summary.errors.push(error);
        Ok(())
    }
}

fn validate_root(root: &Path) -> Result<(), FinderError> {
    if !root.exists() {
        return Err(FinderError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(FinderError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Lazy stream of duplicates produced by [`DuplicateFinder::stream_duplicates`].
///
/// In strict mode the first error is yielded and the stream then ends.
pub struct DuplicateStream {
    inner: Box<dyn Iterator<Item = Fingerprinted>>,
    grouper: StreamingGrouper,
    strict: bool,
    summary: ScanSummary,
    start_time: Instant,
    failed: bool,
}

impl DuplicateStream {
    /// Counters for what has been consumed so far.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Consume the stream's counters.
    #[must_use]
    pub fn into_summary(self) -> ScanSummary {
        self.summary
    }
}

impl std::fmt::Debug for DuplicateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateStream")
            .field("grouper", &self.grouper)
            .field("strict", &self.strict)
            .field("summary", &self.summary)
            .field("failed", &self.failed)
            .finish()
    }
}

impl Iterator for DuplicateStream {
    type Item = Result<DuplicatePair, FinderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let Some(result) = self.inner.next() else {
                self.summary.unique_fingerprints = self.grouper.unique_fingerprints();
                self.summary.scan_duration = self.start_time.elapsed();
                return None;
            };

            match result {
                Ok((fingerprint, path)) => {
                    self.summary.total_files += 1;
                    if let Some(pair) = self.grouper.observe(fingerprint, path) {
                        self.summary.duplicate_files += 1;
                        self.summary.duplicate_groups = self.grouper.duplicate_groups();
                        return Some(Ok(pair));
                    }
                }
                Err(e) if self.strict => {
                    self.failed = true;
                    return Some(Err(FinderError::Scan(e)));
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", e.path().display(), e);
                    self.summary.skipped_files += 1;
                    self.summary.errors.push(e);
                }
            }
        }
    }
}
