//! Error types for the Report Codec subsystem.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Report codec errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Report body is malformed (missing field, empty id, negative amount)
    #[error("Invalid Report Payload: {reason}")]
    InvalidReportPayload { reason: String },

    /// Version tag names no known report version
    #[error("Invalid Version: {version}")]
    InvalidVersion { version: u16 },

    /// A serializer for this version is already registered
    #[error("ReportSerializer for version {version} is already registered")]
    DuplicateSerializerVersion { version: u16 },

    /// No serializer registered for this version
    #[error("Invalid ReportSerializerVersion: {version}")]
    InvalidSerializerVersion { version: u16 },

    /// Amount string is not a valid hex quantity
    #[error("Invalid hex quantity {value:?}: {reason}")]
    InvalidQuantity { value: String, reason: String },

    /// JSON encoding or decoding failed
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Proof does not attest the given report
    #[error("Proof mismatch for {address}: {reason}")]
    ProofMismatch { address: String, reason: String },

    /// Signing or recovery failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl CodecError {
    pub(crate) fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidReportPayload {
            reason: reason.into(),
        }
    }

    /// Registry and payload errors never succeed on retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidReportPayload { .. }
                | Self::InvalidVersion { .. }
                | Self::DuplicateSerializerVersion { .. }
                | Self::InvalidSerializerVersion { .. }
        )
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
