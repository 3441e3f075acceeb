//! # Error Types
//!
//! Errors raised while parsing shared entities.

use thiserror::Error;

/// Errors from parsing an entity out of its textual form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityParseError {
    /// Value is not valid hexadecimal.
    #[error("Invalid hex value {value}: {reason}")]
    InvalidHex { value: String, reason: String },

    /// Decoded byte length does not match the entity width.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
