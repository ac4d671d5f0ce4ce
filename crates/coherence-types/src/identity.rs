//! Content-derived identity fingerprints.
//!
//! An organism's identity is the first 16 hex characters of the SHA-256
//! digest of its source content. Identical content always yields the same
//! identity, so two sources with equal bytes collide by construction.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const IDENTITY_HEX_LEN: usize = 16;

/// Stable 16-hex-character fingerprint of an organism's source content.
///
/// Computed once at admission and never changed for the lifetime of the
/// organism.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Derive the identity of the given content bytes.
    pub fn from_content(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        // 8 digest bytes encode to exactly 16 hex characters.
        let prefix = digest.get(..IDENTITY_HEX_LEN / 2).unwrap_or_default();
        Self(hex::encode(prefix))
    }

    /// Return the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in log lines (first 8 characters).
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl core::fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
