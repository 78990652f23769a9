//! JSON output formatter for duplicate scan results.
//!
//! Unlike the NUL and text formats, JSON lists every member of each group,
//! the first occurrence included.
//!
//! JSON strings must be valid UTF-8, so paths are converted lossily: any
//! byte sequence that is not valid UTF-8 becomes U+FFFD. Use the NUL output
//! when exact path bytes matter.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "fingerprint": "6a3f...",
//!       "files": ["/tree/a/1.txt", "/tree/a/2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "unique_fingerprints": 2,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "skipped_files": 0,
//!     "errors": [],
//!     "scan_duration_ms": 4,
//!     "exit_code": 0,
//!     "exit_code_name": "FD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::scanner::Fingerprint;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Content fingerprint as 32 hex characters
    pub fingerprint: Fingerprint,
    /// Every path in the group, first occurrence first
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            fingerprint: group.fingerprint,
            files: group
                .files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files fingerprinted
    pub total_files: usize,
    /// Number of distinct contents
    pub unique_fingerprints: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Entries skipped because of errors
    pub skipped_files: usize,
    /// Messages for each skipped entry
    pub errors: Vec<String>,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            unique_fingerprints: summary.unique_fingerprints,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            skipped_files: summary.skipped_files,
            errors: summary.errors.iter().map(ToString::to_string).collect(),
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// All duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document from scan results.
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
