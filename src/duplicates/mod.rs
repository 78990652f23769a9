//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping fingerprints into duplicate sets ([`groups`])
//! - Running the enumerate → fingerprint → group pipeline ([`finder`])

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, DuplicateStream, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    group_fingerprints, stream_duplicates, DuplicateGroup, DuplicatePair, FullMapGrouper,
    StreamingGrouper,
};
