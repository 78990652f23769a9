//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! [`Walker`] yields the absolute path of every regular file below a root
//! directory. Children of each directory are sorted by name before they are
//! visited, so two walks over an unmodified tree produce the same sequence.
//!
//! # Symlinks
//!
//! Symlinked directories are not descended unless
//! [`WalkerConfig::follow_symlinks`] is set. A symlink that resolves to a
//! regular file is yielded like the file itself; dangling links are skipped.
//!
//! # Example
//!
//! ```no_run
//! use fdup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use super::{ScanError, WalkerConfig};

/// Recursive file enumerator.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Absolute root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// Relative roots are resolved against the current directory without
    /// touching the filesystem, so symlinks in the root are kept as written.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self { root, config }
    }

    /// Absolute root this walker descends from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding absolute file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; the caller decides whether to abort.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> {
        let root = self.root.clone();
        let follow_symlinks = self.config.follow_symlinks;

        let mut walk_dir = WalkDir::new(&root)
            .follow_links(follow_symlinks)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir = match self.config.threads {
            0 | 1 => walk_dir.parallelism(Parallelism::Serial),
            n => walk_dir.parallelism(Parallelism::RayonNewPool(n)),
        };

        log::debug!("Walking {}", root.display());

        walk_dir
            .into_iter()
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    // The root itself is never a candidate.
                    if entry.depth() == 0 {
                        return None;
                    }

                    let path = entry.path();
                    let file_type = entry.file_type();

                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_file() {
                        log::trace!("Found file: {}", path.display());
                        return Some(Ok(path));
                    }

                    if file_type.is_symlink() {
                        return resolve_symlink(path);
                    }

                    log::trace!("Skipping special file: {}", path.display());
                    None
                }
                Err(e) => {
                    let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    // Followed links are resolved by jwalk, so a dangling one
                    // surfaces as an error rather than a symlink entry.
                    if is_dangling_symlink(&path) {
                        log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
                        return None;
                    }
                    Some(Err(convert_jwalk_error(path, &e)))
                }
            })
    }
}

/// Yield a symlink only if its target is a regular file.
fn resolve_symlink(path: PathBuf) -> Option<Result<PathBuf, ScanError>> {
    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => {
            log::trace!("Found symlinked file: {}", path.display());
            Some(Ok(path))
        }
        Ok(_) => {
            log::debug!("Skipping symlink to non-file: {}", path.display());
            None
        }
        Err(e) => {
            log::debug!("Skipping dangling symlink {}: {}", path.display(), e);
            None
        }
    }
}

fn is_dangling_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
        && std::fs::metadata(path).is_err()
}

fn convert_jwalk_error(path: PathBuf, error: &jwalk::Error) -> ScanError {
    log::debug!("Walker error for {}: {}", path.display(), error);
    match error.io_error() {
        Some(io) => ScanError::from_io(&path, std::io::Error::new(io.kind(), io.to_string())),
        None => ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        },
    }
}
