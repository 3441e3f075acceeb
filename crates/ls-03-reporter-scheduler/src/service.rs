//! Reporter Scheduler service.
//!
//! Every decision is a pure function of live ledger data and the elapsed time
//! since the bundle window opened. Nothing is cached between bundles.

use crate::domain::{
    buffer_for, current_reporter, is_authorized, may_submit, slot_index, tally, QuorumSchedule,
    ReporterSlot,
};
use crate::error::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::time::Duration;
use tracing::debug;

/// Scheduler configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between consecutive reporter slots
    pub report_time_buffer: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            report_time_buffer: Duration::from_secs(60),
        }
    }
}

/// Ledger facts a scheduling decision is made from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerView {
    /// Reporter order as returned by the ledger
    pub reporters: Vec<Address>,
    pub active_nodes: u64,
    pub schedule: QuorumSchedule,
    /// Stake of the node being scheduled
    pub stake: i128,
    pub minimum_stake: i128,
}

/// When and under which quorum the local node may submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPlan {
    pub slot: ReporterSlot,
    /// Remaining wait from the moment of planning
    pub wait: Duration,
}

impl SubmissionPlan {
    pub fn slot_index(&self) -> usize {
        self.slot.index
    }

    pub fn quorum(&self) -> usize {
        self.slot.quorum
    }

    pub fn is_due(&self) -> bool {
        self.wait.is_zero()
    }
}

/// Reporter rotation and quorum gating.
#[derive(Clone, Debug, Default)]
pub struct ReporterScheduler {
    config: SchedulerConfig,
}

impl ReporterScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn buffer_for(&self, slot: usize) -> Duration {
        buffer_for(slot, self.config.report_time_buffer)
    }

    pub fn current_reporter(&self, reporters: &[Address], now_offset: Duration) -> Option<Address> {
        current_reporter(reporters, now_offset, self.config.report_time_buffer)
    }

    pub fn is_authorized(&self, address: &Address, reporters: &[Address]) -> bool {
        is_authorized(address, reporters)
    }

    pub fn may_submit(&self, address: &Address, reporters: &[Address], now_offset: Duration) -> bool {
        may_submit(address, reporters, now_offset, self.config.report_time_buffer)
    }

    /// Ledger threshold for `active_nodes`; never derived locally.
    pub fn quorum_required(
        &self,
        schedule: &QuorumSchedule,
        active_nodes: u64,
    ) -> SchedulerResult<usize> {
        schedule.required_for(active_nodes)
    }

    /// Slot index of `address`, or why it may not report.
    pub fn authorize(&self, address: &Address, view: &LedgerView) -> SchedulerResult<usize> {
        if view.reporters.is_empty() {
            return Err(SchedulerError::NoReporters);
        }
        if view.stake < view.minimum_stake {
            return Err(SchedulerError::StakeRequired {
                address: *address,
                stake: view.stake,
                minimum: view.minimum_stake,
            });
        }
        slot_index(address, &view.reporters).ok_or(SchedulerError::InvalidReporter {
            address: *address,
        })
    }

    /// Distinct authorized signers, or `QuorumNotMet`.
    pub fn check_quorum<'a>(
        &self,
        signers: impl IntoIterator<Item = &'a Address>,
        view: &LedgerView,
    ) -> SchedulerResult<usize> {
        let signatures = tally(signers, &view.reporters);
        let required = self.quorum_required(&view.schedule, view.active_nodes)?;
        if signatures < required {
            return Err(SchedulerError::QuorumNotMet {
                signatures,
                required,
            });
        }
        Ok(signatures)
    }

    /// Plan the local node's submission `elapsed` after the window opened.
    pub fn plan(
        &self,
        local: &Address,
        view: &LedgerView,
        elapsed: Duration,
    ) -> SchedulerResult<SubmissionPlan> {
        let index = self.authorize(local, view)?;
        let slot = ReporterSlot {
            reporters: view.reporters.clone(),
            index,
            buffer: self.config.report_time_buffer,
            quorum: self.quorum_required(&view.schedule, view.active_nodes)?,
        };
        let wait = slot.opens_at().saturating_sub(elapsed);

        debug!(
            reporter = %local,
            slot = index,
            quorum = slot.quorum,
            wait_ms = wait.as_millis() as u64,
            "Submission planned"
        );

        Ok(SubmissionPlan { slot, wait })
    }
}
