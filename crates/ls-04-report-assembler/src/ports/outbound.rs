//! # Outbound Ports (Driven Ports / SPI)
//!
//! The ledger is the final arbiter of stake, quorum and signature validity.
//! The assembler reads live state from it before every decision and never
//! caches reporter lists as authoritative.

use crate::domain::{Bundle, HeightWindow, UsageAggregates};
use async_trait::async_trait;
use ls_02_report_codec::SubmissionPayload;
use ls_03_reporter_scheduler::QuorumSchedule;
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockHeight, BundleId, Hash};
use thiserror::Error;

/// Errors surfaced by the settlement ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Submitter is not a registered reporter
    #[error("Invalid reporter: {address}")]
    InvalidReporter { address: Address },

    /// Submitter stake is below the minimum
    #[error("Stake required: {address}")]
    StakeRequired { address: Address },

    /// Too few valid reporter signatures
    #[error("Quorum not met: {signatures} of {required}")]
    QuorumNotMet { signatures: usize, required: usize },

    /// Network or node failure; the call may be repeated
    #[error("Transient ledger failure: {reason}")]
    Transient { reason: String },

    /// Rejected for any other reason
    #[error("Rejected: {reason}")]
    Rejected { reason: String },
}

impl LedgerError {
    /// The same call may succeed if repeated unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// The bundle may succeed on a later attempt, possibly with a new payload.
    pub fn is_retryable(&self) -> bool {
        self.is_transient() || matches!(self, Self::QuorumNotMet { .. })
    }
}

/// Most recently accepted report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastReport {
    pub id: BundleId,
    pub height: BlockHeight,
}

/// Acknowledgement of a submitted report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub bundle_id: BundleId,
    /// Ledger transaction identifier
    pub transaction: Hash,
}

/// Settlement ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Reporter addresses in ledger (reputation) order.
    async fn get_reporters(&self) -> Result<Vec<Address>, LedgerError>;

    /// Number of active nodes.
    async fn total_nodes(&self) -> Result<u64, LedgerError>;

    async fn quorum_schedule(&self) -> Result<QuorumSchedule, LedgerError>;

    async fn stake_of(&self, address: &Address) -> Result<i128, LedgerError>;

    async fn minimum_stake(&self) -> Result<i128, LedgerError>;

    async fn last_report(&self) -> Result<Option<LastReport>, LedgerError>;

    /// Network-wide genesis block height.
    async fn start_block_number(&self) -> Result<BlockHeight, LedgerError>;

    /// Submit a report on behalf of `submitter`.
    async fn submit_report(
        &self,
        submitter: Address,
        payload: SubmissionPayload,
    ) -> Result<LedgerReceipt, LedgerError>;
}

/// Read-only view over the storage and query collaborators.
#[async_trait]
pub trait UsageProvider: Send + Sync {
    async fn usage_for_window(
        &self,
        bundle: &Bundle,
        window: HeightWindow,
    ) -> Result<UsageAggregates, String>;
}

/// Wall clock for proof timestamps.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> u64 {
        ls_02_report_codec::now_millis()
    }
}
