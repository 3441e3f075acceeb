//! # Core Domain Entities
//!
//! Defines the entities that cross subsystem boundaries in the report
//! consensus workspace.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `SourceId`
//! - **Chain**: `Hash`, `ChainBlock`, `BlockHeight`, `Timestamp`
//! - **Reporting**: `BundleId`, `ProofOfReport`, `RecoverableSignature`

use crate::errors::EntityParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A 32-byte keccak256 digest.
pub type Hash = [u8; 32];

/// Ledger block number.
pub type BlockHeight = u64;

/// Timestamp as reported by a chain-data source or the local clock.
///
/// The unit is whatever the producer emits; the time index only compares
/// timestamps with each other.
pub type Timestamp = u64;

/// A single `{number, timestamp}` observation from a chain-data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBlock {
    /// Block number on the ledger chain.
    pub number: BlockHeight,
    /// Block timestamp.
    pub timestamp: Timestamp,
}

impl ChainBlock {
    pub fn new(number: BlockHeight, timestamp: Timestamp) -> Self {
        Self { number, timestamp }
    }
}

/// Render a hash as a `0x`-prefixed lowercase hex string.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// A 20-byte ledger account address.
///
/// Displayed and serialized as a `0x`-prefixed lowercase hex string so that
/// every node renders the same address identically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x` hex rendering.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = EntityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| EntityParseError::InvalidHex {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| EntityParseError::InvalidLength {
                expected: 20,
                actual: v.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a chain-data source (typically its RPC endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER C: REPORTING
// =============================================================================

/// Opaque bundle identifier. One report is produced per bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleId(pub String);

impl BundleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BundleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Recoverable secp256k1 signature: `r (32) || s (32) || v (1)`, with
/// `v ∈ {27, 28}` as the ledger expects.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; 65]);

impl RecoverableSignature {
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}

impl FromStr for RecoverableSignature {
    type Err = EntityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| EntityParseError::InvalidHex {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 65] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| EntityParseError::InvalidLength {
                expected: 65,
                actual: v.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RecoverableSignature::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One node's attestation of a report.
///
/// `toth` ("timestamp over hash") binds the report body to the submission
/// `timestamp`; the signature is produced over the raw bytes of `toth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfReport {
    /// Canonical digest of the report body.
    #[serde(with = "hex_hash")]
    pub hash: Hash,
    /// Digest of the report body concatenated with `timestamp`.
    #[serde(with = "hex_hash")]
    pub toth: Hash,
    /// Signer address.
    pub address: Address,
    /// Signature over `toth`.
    pub signature: RecoverableSignature,
    /// Submission timestamp in milliseconds.
    pub timestamp: u64,
}

mod hex_hash {
    use super::Hash;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("hash must be 32 bytes"))
    }
}
