//! Output formatters for duplicate scan results.
//!
//! This module provides the output formats written to stdout:
//! - NUL-terminated paths for `xargs -0` style consumption ([`nul`])
//! - Human-readable `first: other` lines ([`text`])
//! - JSON for automation and scripting ([`json`])
//!
//! The NUL and text formats implement [`DuplicateReporter`], so they can be
//! fed either whole groups or pairs from a streaming scan.
//!
//! # Example
//!
//! ```no_run
//! use fdup::duplicates::DuplicateFinder;
//! use fdup::output::{report_groups, TextOutput};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let mut output = TextOutput::new(std::io::stdout().lock());
//! report_groups(&mut output, &groups).unwrap();
//! ```

pub mod json;
pub mod nul;
pub mod text;

use std::io;
use std::path::Path;

use crate::duplicates::DuplicateGroup;

// Re-export main types
pub use json::JsonOutput;
pub use nul::NulOutput;
pub use text::{TextOutput, VERBOSE_HEADER};

/// Incremental writer for duplicate reports.
///
/// Only non-first members are ever reported, each alongside the first
/// occurrence of its content.
pub trait DuplicateReporter {
    /// Write anything that precedes the first duplicate.
    fn begin(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Write one duplicate.
    fn report(&mut self, original: &Path, duplicate: &Path) -> io::Result<()>;

    /// Flush the underlying writer.
    fn finish(&mut self) -> io::Result<()>;
}

/// Report every non-first member of every group, in group order.
///
/// # Errors
///
/// Returns the first write error.
pub fn report_groups<R>(reporter: &mut R, groups: &[DuplicateGroup]) -> io::Result<()>
where
    R: DuplicateReporter + ?Sized,
{
    reporter.begin()?;
    for group in groups {
        for (original, duplicate) in group.pairs() {
            reporter.report(original, duplicate)?;
        }
    }
    reporter.finish()
}
