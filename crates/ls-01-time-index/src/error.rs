//! Error types for the Time Index subsystem

use shared_types::{BlockHeight, SourceId, Timestamp};
use thiserror::Error;

/// Time index errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeIndexError {
    /// Two sources reported different heights for the same timestamp
    #[error(
        "Source {source_id} reported height {reported_height} for timestamp {timestamp}, \
         but {existing_sources:?} agreed on height {existing_height}"
    )]
    SourceDisagreement {
        timestamp: Timestamp,
        existing_height: BlockHeight,
        existing_sources: Vec<SourceId>,
        source_id: SourceId,
        reported_height: BlockHeight,
    },

    /// No entry within the scan buffer of the requested timestamp
    #[error("No time index entry near timestamp {timestamp}")]
    TimeIndexLookupFailed { timestamp: Timestamp },

    /// Readiness was requested but the indexer stopped without becoming ready
    #[error("Time index is not ready")]
    NotReady,

    /// Indexer halted; requires operator intervention
    #[error("Time index halted: {reason}")]
    Failed { reason: String },

    /// Persisted index failure
    #[error("Time index store error: {reason}")]
    Store { reason: String },

    /// Chain-data source failure
    #[error("Chain-data source {source_id} failed: {reason}")]
    Source { source_id: SourceId, reason: String },

    /// Neither the index, the ledger nor the genesis configuration produced a start height
    #[error("Start height could not be resolved: {reason}")]
    StartHeightUnresolved { reason: String },

    /// Shutdown was requested while waiting
    #[error("Operation cancelled by shutdown")]
    Cancelled,
}

impl TimeIndexError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TimeIndexError::Source { .. }
                | TimeIndexError::Store { .. }
                | TimeIndexError::NotReady
                | TimeIndexError::StartHeightUnresolved { .. }
        )
    }

    /// Failures that halt the indexer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TimeIndexError::SourceDisagreement { .. } | TimeIndexError::Failed { .. }
        )
    }
}

/// Result type for time index operations
pub type TimeIndexResult<T> = Result<T, TimeIndexError>;
