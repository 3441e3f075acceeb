//! Error types for the Report Assembler subsystem.

use crate::ports::outbound::LedgerError;
use ls_01_time_index::TimeIndexError;
use ls_02_report_codec::CodecError;
use ls_03_reporter_scheduler::SchedulerError;
use shared_types::{BlockHeight, BundleId};
use thiserror::Error;

/// Report assembly errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("Time index: {0}")]
    TimeIndex(#[from] TimeIndexError),

    #[error("Codec: {0}")]
    Codec(#[from] CodecError),

    #[error("Scheduler: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Ledger: {0}")]
    Ledger(#[from] LedgerError),

    /// Usage collaborators could not produce aggregates
    #[error("Usage unavailable for bundle {bundle_id}: {reason}")]
    Usage { bundle_id: BundleId, reason: String },

    /// Bundle resolves to an inverted height window
    #[error("Invalid window for bundle {bundle_id}: {from}..={to}")]
    InvalidWindow {
        bundle_id: BundleId,
        from: BlockHeight,
        to: BlockHeight,
    },

    /// Amount arithmetic left the representable range
    #[error("Amount overflow while building bundle {bundle_id}")]
    AmountOverflow { bundle_id: BundleId },

    /// Bundle was already submitted by this node
    #[error("Bundle {bundle_id} already submitted")]
    AlreadySubmitted { bundle_id: BundleId },

    /// Shutdown fired while waiting
    #[error("Cancelled")]
    Cancelled,
}

impl AssemblerError {
    /// The same bundle may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TimeIndex(e) => e.is_retryable(),
            Self::Scheduler(e) => e.is_retryable(),
            Self::Ledger(e) => e.is_retryable(),
            Self::Usage { .. } => true,
            _ => false,
        }
    }

    /// Configuration or data-integrity failure; processing must stop.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::TimeIndex(e) => e.is_fatal(),
            Self::Codec(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimeIndex(_) => "time_index",
            Self::Codec(_) => "codec",
            Self::Scheduler(SchedulerError::QuorumNotMet { .. }) => "quorum_not_met",
            Self::Scheduler(
                SchedulerError::InvalidSchedule { .. } | SchedulerError::NoQuorumTier { .. },
            ) => "invalid_schedule",
            Self::Scheduler(_) => "unauthorized",
            Self::Ledger(_) => "ledger",
            Self::Usage { .. } => "usage",
            Self::InvalidWindow { .. } => "invalid_window",
            Self::AmountOverflow { .. } => "overflow",
            Self::AlreadySubmitted { .. } => "already_submitted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result type for assembler operations
pub type AssemblerResult<T> = Result<T, AssemblerError>;
