//! In-memory settlement ledger.
//!
//! Enforces the same gates as the on-chain report manager: listed reporter,
//! minimum stake, reporter rotation, one report per bundle, and a quorum of
//! valid reporter signatures over each signer's timestamped hash. Accepted
//! reports are announced on the event bus.
//!
//! Rotation is measured from the opening of the current round, which starts
//! at construction and again after every accepted report. The reporter at
//! index `i` is refused as `InvalidReporter` until `i × buffer` has passed.

use crate::ports::outbound::{LastReport, Ledger, LedgerError, LedgerReceipt};
use async_trait::async_trait;
use ls_02_report_codec::{contract_hash, SubmissionPayload};
use ls_03_reporter_scheduler::{buffer_for, QuorumSchedule};
use parking_lot::RwLock;
use shared_bus::{EventPublisher, ReportEvent};
use shared_crypto::{keccak256, recover_signer};
use shared_types::{Address, BlockHeight, BundleId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

struct LedgerState {
    reporters: Vec<Address>,
    stakes: HashMap<Address, i128>,
    minimum_stake: i128,
    total_nodes: u64,
    schedule: QuorumSchedule,
    report_time_buffer: Duration,
    round_opened: Instant,
    start_block: BlockHeight,
    last_report: Option<LastReport>,
    accepted: BTreeMap<BundleId, SubmissionPayload>,
    failures_remaining: u32,
}

pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl InMemoryLedger {
    /// Every reporter starts with exactly the minimum stake (1). Slots are
    /// 60 s apart.
    pub fn new(reporters: Vec<Address>, schedule: QuorumSchedule) -> Self {
        let stakes = reporters.iter().map(|r| (*r, 1)).collect();
        Self {
            state: RwLock::new(LedgerState {
                total_nodes: reporters.len() as u64,
                reporters,
                stakes,
                minimum_stake: 1,
                schedule,
                report_time_buffer: Duration::from_secs(60),
                round_opened: Instant::now(),
                start_block: 0,
                last_report: None,
                accepted: BTreeMap::new(),
                failures_remaining: 0,
            }),
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_start_block(self, height: BlockHeight) -> Self {
        self.state.write().start_block = height;
        self
    }

    pub fn with_minimum_stake(self, minimum: i128) -> Self {
        self.state.write().minimum_stake = minimum;
        self
    }

    /// Delay between reporter slots. Zero disables rotation.
    pub fn with_report_time_buffer(self, buffer: Duration) -> Self {
        self.state.write().report_time_buffer = buffer;
        self
    }

    /// Restart the rotation clock, as when a new bundle window opens.
    pub fn open_round(&self) {
        self.state.write().round_opened = Instant::now();
    }

    pub fn set_stake(&self, address: Address, stake: i128) {
        self.state.write().stakes.insert(address, stake);
    }

    pub fn set_total_nodes(&self, total: u64) {
        self.state.write().total_nodes = total;
    }

    pub fn set_last_report(&self, report: LastReport) {
        self.state.write().last_report = Some(report);
    }

    /// Fail the next `count` calls with a transient error.
    pub fn fail_next(&self, count: u32) {
        self.state.write().failures_remaining = count;
    }

    pub fn accepted(&self, bundle_id: &BundleId) -> Option<SubmissionPayload> {
        self.state.read().accepted.get(bundle_id).cloned()
    }

    pub fn accepted_count(&self) -> usize {
        self.state.read().accepted.len()
    }

    fn maybe_fail(&self) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(LedgerError::Transient {
                reason: "ledger node unavailable".into(),
            });
        }
        Ok(())
    }

    /// Distinct listed reporters whose signature recovers to their column.
    fn valid_signers(payload: &SubmissionPayload, reporters: &[Address]) -> usize {
        payload
            .addresses
            .iter()
            .zip(&payload.timestamps)
            .zip(&payload.signatures)
            .filter(|((address, timestamp), signature)| {
                let toth = contract_hash(&payload.params, Some(**timestamp));
                reporters.contains(address)
                    && recover_signer(&toth, signature).ok().as_ref() == Some(*address)
            })
            .map(|((address, _), _)| *address)
            .collect::<BTreeSet<_>>()
            .len()
    }

    fn accept(&self, submitter: Address, payload: SubmissionPayload) -> Result<LedgerReceipt, LedgerError> {
        let mut state = self.state.write();

        let Some(index) = state.reporters.iter().position(|r| *r == submitter) else {
            return Err(LedgerError::InvalidReporter { address: submitter });
        };
        let stake = state.stakes.get(&submitter).copied().unwrap_or_default();
        if stake < state.minimum_stake {
            return Err(LedgerError::StakeRequired { address: submitter });
        }
        let elapsed = state.round_opened.elapsed();
        if elapsed < buffer_for(index, state.report_time_buffer) {
            debug!(
                reporter = %submitter,
                slot = index,
                elapsed_ms = elapsed.as_millis() as u64,
                "Reporter submitted before its slot"
            );
            return Err(LedgerError::InvalidReporter { address: submitter });
        }

        let bundle_id = BundleId::new(payload.params.id.clone());
        if state.accepted.contains_key(&bundle_id) {
            return Err(LedgerError::Rejected {
                reason: format!("bundle {} already reported", bundle_id),
            });
        }
        let columns = payload.addresses.len();
        if payload.timestamps.len() != columns || payload.signatures.len() != columns {
            return Err(LedgerError::Rejected {
                reason: "signature columns differ in length".into(),
            });
        }

        let signatures = Self::valid_signers(&payload, &state.reporters);
        let required = state
            .schedule
            .required_for(state.total_nodes)
            .map_err(|e| LedgerError::Rejected {
                reason: e.to_string(),
            })?;
        if signatures < required {
            return Err(LedgerError::QuorumNotMet {
                signatures,
                required,
            });
        }

        let transaction = keccak256(format!("{}:{}", bundle_id, state.accepted.len()).as_bytes());
        state.last_report = Some(LastReport {
            id: bundle_id.clone(),
            height: payload.params.height,
        });
        state.accepted.insert(bundle_id.clone(), payload);
        state.round_opened = Instant::now();

        Ok(LedgerReceipt {
            bundle_id,
            transaction,
        })
    }

    async fn publish(&self, event: ReportEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event).await;
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn get_reporters(&self) -> Result<Vec<Address>, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().reporters.clone())
    }

    async fn total_nodes(&self) -> Result<u64, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().total_nodes)
    }

    async fn quorum_schedule(&self) -> Result<QuorumSchedule, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().schedule.clone())
    }

    async fn stake_of(&self, address: &Address) -> Result<i128, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().stakes.get(address).copied().unwrap_or_default())
    }

    async fn minimum_stake(&self) -> Result<i128, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().minimum_stake)
    }

    async fn last_report(&self) -> Result<Option<LastReport>, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().last_report.clone())
    }

    async fn start_block_number(&self) -> Result<BlockHeight, LedgerError> {
        self.maybe_fail()?;
        Ok(self.state.read().start_block)
    }

    async fn submit_report(
        &self,
        submitter: Address,
        payload: SubmissionPayload,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.maybe_fail()?;
        let hash = contract_hash(&payload.params, None);
        let receipt = self.accept(submitter, payload).inspect_err(|e| {
            debug!(reporter = %submitter, error = %e, "Report submission refused");
        })?;

        info!(bundle_id = %receipt.bundle_id, reporter = %submitter, "Report accepted");
        self.publish(ReportEvent::ReportSubmitted {
            bundle_id: receipt.bundle_id.clone(),
            reporter: submitter,
            hash,
        })
        .await;
        self.publish(ReportEvent::ReportAccepted {
            bundle_id: receipt.bundle_id.clone(),
        })
        .await;
        self.publish(ReportEvent::ReportProcessed {
            bundle_id: receipt.bundle_id.clone(),
        })
        .await;
        Ok(receipt)
    }
}
