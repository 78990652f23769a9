//! NUL-terminated path output.
//!
//! Every duplicate beyond the first of its group is written as the raw path
//! followed by a single `\0` byte. Nothing else is written: no header, no
//! newlines. Paths may therefore contain any byte except NUL, newlines
//! included, and still be split reliably with `xargs -0` or `read -d ''`.

use std::io::{self, Write};
use std::path::Path;

use super::DuplicateReporter;

/// Writes duplicate paths terminated by `\0`.
#[derive(Debug)]
pub struct NulOutput<W: Write> {
    writer: W,
}

impl<W: Write> NulOutput<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DuplicateReporter for NulOutput<W> {
    fn report(&mut self, _original: &Path, duplicate: &Path) -> io::Result<()> {
        write_path_bytes(&mut self.writer, duplicate)?;
        self.writer.write_all(b"\0")
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(unix)]
fn write_path_bytes<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    writer.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path_bytes<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    writer.write_all(path.to_string_lossy().as_bytes())
}
