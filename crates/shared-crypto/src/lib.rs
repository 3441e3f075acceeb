//! # Shared Crypto - Ledger Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Report hashes, personal-message digests |
//! | `ecdsa` | secp256k1 (recoverable) | Reporter keys, proof signatures |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **Recovery**: signer address is derived from the signature, never trusted
//!   from the payload

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{address_from_verifying_key, recover_signer, sign_personal_message, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use hashing::{keccak256, personal_message_hash, KeccakHasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
