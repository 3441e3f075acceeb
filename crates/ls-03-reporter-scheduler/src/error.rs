//! Error types for the Reporter Scheduler subsystem.

use shared_types::Address;
use thiserror::Error;

/// Scheduling and authorization errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Address is not in the ledger's reporter list
    #[error("Invalid reporter: {address}")]
    InvalidReporter { address: Address },

    /// Reporter stake is below the ledger minimum
    #[error("Stake required: {address} holds {stake}, minimum is {minimum}")]
    StakeRequired {
        address: Address,
        stake: i128,
        minimum: i128,
    },

    /// Not enough distinct reporter signatures
    #[error("Quorum not met: {signatures} of {required} required signatures")]
    QuorumNotMet { signatures: usize, required: usize },

    /// The ledger returned no reporters
    #[error("No reporters registered")]
    NoReporters,

    /// Quorum schedule tiers are malformed
    #[error("Invalid quorum schedule: {reason}")]
    InvalidSchedule { reason: String },

    /// No schedule tier covers the active node count
    #[error("No quorum tier for {active_nodes} active nodes")]
    NoQuorumTier { active_nodes: u64 },
}

impl SchedulerError {
    /// More signatures may still arrive.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QuorumNotMet { .. })
    }

    /// The local node must not submit at all.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::InvalidReporter { .. } | Self::StakeRequired { .. })
    }
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
