//! Human-readable duplicate listing.
//!
//! ```text
//! First occurence: Other occurence
//! /tree/a/1.txt: /tree/a/2.txt
//! /tree/a/1.txt: /tree/c/5.txt
//! ```

use std::io::{self, Write};
use std::path::Path;

use super::DuplicateReporter;

/// Header line written before any duplicate, even when there are none.
pub const VERBOSE_HEADER: &str = "First occurence: Other occurence";

/// Writes one `first: other` line per duplicate.
#[derive(Debug)]
pub struct TextOutput<W: Write> {
    writer: W,
}

impl<W: Write> TextOutput<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DuplicateReporter for TextOutput<W> {
    fn begin(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{VERBOSE_HEADER}")
    }

    fn report(&mut self, original: &Path, duplicate: &Path) -> io::Result<()> {
        writeln!(self.writer, "{}: {}", original.display(), duplicate.display())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
