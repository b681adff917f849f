use std::fmt;

use sha2::{Digest, Sha256};

/// Fixed-length fingerprint of a caller-built logical key.
///
/// Two logical keys with the same SHA-256 digest address the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn fingerprint(logical_key: &str) -> Self {
        let digest = Sha256::digest(logical_key.as_bytes());
        Self(digest.into())
    }

    /// First 8 hex chars, enough to correlate log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Returns at most `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
