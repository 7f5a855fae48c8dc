//! Stable, content-based identifiers for scenarios and stories.
//!
//! An identifier is the SHA-256 of the normalized name segments. Segments are
//! trimmed, lowercased and have inner whitespace collapsed, then each one is
//! fed to the hasher with a length prefix so `["a;b"]` and `["a", "b"]` can
//! never produce the same input.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive an identifier from an ordered path of names
pub fn derive_from<I, S>(segments: I) -> Identifier
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for segment in segments {
        let normalized = normalize_segment(segment.as_ref());
        hasher.update((normalized.len() as u64).to_le_bytes());
        hasher.update(normalized.as_bytes());
    }
    Identifier(format!("{:x}", hasher.finalize()))
}

fn normalize_segment(segment: &str) -> String {
    segment
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
