//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] reads a file in fixed-size chunks and feeds every byte into
//! BLAKE3. The first [`FINGERPRINT_LEN`] bytes of the extendable output form
//! the file's [`Fingerprint`]. Byte-identical inputs always produce identical
//! fingerprints; a collision between different contents at 128 bits is
//! accepted and not checked for.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::HashError;

/// Fingerprint width in bytes (128 bits).
pub const FINGERPRINT_LEN: usize = 16;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Content fingerprint of a whole file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex encoding (32 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(FINGERPRINT_LEN * 2);
        for byte in &self.0 {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Error returned when parsing a hex fingerprint fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFingerprintError {
    /// The string is not exactly 32 characters long.
    #[error("expected {expected} hex characters, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Length of the input
        actual: usize,
    },

    /// The string contains a non-hex character.
    #[error("invalid hex digit at position {0}")]
    InvalidDigit(usize),
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_LEN * 2 {
            return Err(ParseFingerprintError::InvalidLength {
                expected: FINGERPRINT_LEN * 2,
                actual: s.len(),
            });
        }

        let mut bytes = [0u8; FINGERPRINT_LEN];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let high = hex_value(chunk[0]).ok_or(ParseFingerprintError::InvalidDigit(i * 2))?;
            let low = hex_value(chunk[1]).ok_or(ParseFingerprintError::InvalidDigit(i * 2 + 1))?;
            bytes[i] = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Streaming content hasher.
///
/// Cheap to construct and `Sync`, so one instance can be shared by all
/// fingerprinting threads. Each call allocates its own read buffer.
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
    /// Create a hasher with the default 64 KiB read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Create a hasher with a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Read buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Fingerprint the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    /// The file is opened exactly once; there is no retry.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let fingerprint = self
            .fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Fingerprinted {}: {}", path.display(), fingerprint);
        Ok(fingerprint)
    }

    /// Fingerprint everything `reader` yields until EOF.
    ///
    /// # Errors
    ///
    /// Returns the first read error other than `Interrupted`.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        Ok(finalize(&hasher))
    }

    /// Fingerprint an in-memory byte slice.
    #[must_use]
    pub fn fingerprint_bytes(&self, data: &[u8]) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(data);
        finalize(&hasher)
    }
}

fn finalize(hasher: &blake3::Hasher) -> Fingerprint {
    let mut bytes = [0u8; FINGERPRINT_LEN];
    hasher.finalize_xof().fill(&mut bytes);
    Fingerprint(bytes)
}

/// Lazily fingerprint each path, pairing the digest with its path.
///
/// Paths are processed strictly in input order, one file fully read before
/// the next is opened.
pub fn fingerprint_paths<'a, I>(
    hasher: &'a Hasher,
    paths: I,
) -> impl Iterator<Item = Result<(Fingerprint, PathBuf), HashError>> + 'a
where
    I: IntoIterator<Item = PathBuf>,
    I::IntoIter: 'a,
{
    paths
        .into_iter()
        .map(move |path| hasher.fingerprint(&path).map(|fingerprint| (fingerprint, path)))
}
