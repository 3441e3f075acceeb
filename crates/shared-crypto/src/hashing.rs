//! # Keccak-256 Hashing
//!
//! Ledger-compatible digests used for report hashes and signer addresses.

use sha3::{Digest, Keccak256};

/// Keccak-256 output (256-bit).
pub type Hash = [u8; 32];

/// Prefix applied by the ledger's personal-message signing scheme.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Stateful Keccak-256 hasher.
pub struct KeccakHasher {
    inner: Keccak256,
}

impl KeccakHasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

impl Default for KeccakHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with Keccak-256 (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Digest signed by a personal-message signature over `message`.
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn personal_message_hash(message: &[u8]) -> Hash {
    let mut hasher = KeccakHasher::new();
    hasher
        .update(PERSONAL_MESSAGE_PREFIX.as_bytes())
        .update(message.len().to_string().as_bytes())
        .update(message);
    hasher.finalize()
}
