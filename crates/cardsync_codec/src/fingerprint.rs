//! Content fingerprints used for duplicate detection.

use sha2::{Digest, Sha256};
use std::fmt;

/// Number of digest bytes kept in a fingerprint (16 hex characters).
const FINGERPRINT_BYTES: usize = 8;

/// A deterministic digest over the normalized `(question, answer)` pair.
///
/// Two cards with the same fingerprint are content duplicates regardless of
/// their remote id, tags or archived flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of a question/answer pair.
    ///
    /// Both sides are normalized first so that formatting-only differences
    /// (line endings, trailing spaces, surrounding blank lines) produce the
    /// same fingerprint.
    pub fn of(question: &str, answer: &str) -> Self {
        let canonical = format!("{}\n---\n{}", normalize_text(question), normalize_text(answer));
        let digest = Sha256::digest(canonical.as_bytes());
        Self(hex::encode(&digest[..FINGERPRINT_BYTES]))
    }

    /// Returns the hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes card text for fingerprinting.
///
/// CRLF becomes LF, trailing whitespace is stripped from every line and the
/// whole text is trimmed.
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
