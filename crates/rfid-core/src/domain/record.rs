//! The scan record: the text of one completed frame.
//!
//! A record is produced by the [`crate::framing::StreamFramer`] once it sees
//! the END delimiter, and then copied to every fan-out output.  Because each
//! bridge receives its own copy, the text is stored behind an `Arc<str>` so a
//! clone is a reference-count bump rather than a heap allocation.
//!
//! # Byte interpretation
//!
//! The reader sends one byte per character.  Each byte is mapped to the
//! Unicode scalar with the same numeric value (ISO-8859-1 / Latin-1), so a
//! record never fails to decode: `0x33` becomes `'3'`, and a stray `0xB0`
//! becomes `'°'` rather than an error.  The framer performs no content
//! validation beyond its length bound.

use std::fmt;
use std::sync::Arc;

/// The decoded text content of one completed frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanRecord {
    text: Arc<str>,
    raw_len: usize,
}

impl ScanRecord {
    /// Builds a record from the raw frame bytes (delimiters excluded).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text: String = bytes.iter().map(|&b| char::from(b)).collect();
        Self {
            text: Arc::from(text),
            raw_len: bytes.len(),
        }
    }

    /// Returns the record text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of raw bytes the frame contained.
    ///
    /// This differs from `as_str().len()` when the frame carried bytes above
    /// 0x7F, which take two bytes once encoded as UTF-8.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// `true` for a frame with no content (START immediately followed by END).
    pub fn is_empty(&self) -> bool {
        self.raw_len == 0
    }
}

impl From<&str> for ScanRecord {
    fn from(value: &str) -> Self {
        Self {
            raw_len: value.chars().count(),
            text: Arc::from(value),
        }
    }
}

impl AsRef<str> for ScanRecord {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ScanRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
