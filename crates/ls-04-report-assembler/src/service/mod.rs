//! Report Assembler service.
//!
//! Drives one bundle from time window to ledger submission:
//!
//! ```text
//! wait ready → window → usage → build → attest → gossip
//!     → window open → ledger view → plan slot
//!     → wait slot (abstain on identical peer report)
//!     → collect quorum → submit (retry transient) → mark submitted
//! ```
//!
//! The slot clock starts once the local report is built and gossiped. Time
//! spent waiting for the time index or the usage collaborators never counts
//! toward `i × buffer`.

use crate::domain::{Bundle, FeeConfig, HeightWindow, Outcome, ProofPool, ReportBuilder};
use crate::error::{AssemblerError, AssemblerResult};
use crate::metrics;
use crate::ports::inbound::ReportAssemblerApi;
use crate::ports::outbound::{Ledger, LedgerError, SystemTimeSource, TimeSource, UsageProvider};
use async_trait::async_trait;
use ls_01_time_index::{Backoff, BackoffConfig, TimeIndexApi, TimeIndexError};
use ls_02_report_codec::{Report, ReportCodec, ReportSigner};
use ls_03_reporter_scheduler::{LedgerView, ReporterScheduler, SchedulerConfig, SchedulerError};
use parking_lot::RwLock;
use shared_bus::{EventFilter, EventPublisher, EventTopic, ReportEvent, Shutdown, Subscription};
use shared_crypto::recover_signer;
use shared_types::{hash_to_hex, Address, BundleId, Hash, ProofOfReport};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};


/// Retry policy for ledger calls and whole bundles
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Attempts including the first
    pub max_attempts: u32,
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Assembler configuration
#[derive(Clone, Debug)]
pub struct AssemblerConfig {
    pub scheduler: SchedulerConfig,
    pub fees: FeeConfig,
    pub retry: RetryPolicy,
    /// How long an open slot waits for missing signatures
    pub quorum_timeout: Duration,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            fees: FeeConfig::default(),
            retry: RetryPolicy::default(),
            quorum_timeout: Duration::from_secs(120),
        }
    }
}

/// Per-bundle report assembly and submission.
pub struct ReportAssembler<L, U, I>
where
    L: Ledger,
    U: UsageProvider,
    I: TimeIndexApi,
{
    config: AssemblerConfig,
    signer: Arc<dyn ReportSigner>,
    ledger: Arc<L>,
    usage: Arc<U>,
    time_index: Arc<I>,
    publisher: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    codec: ReportCodec,
    scheduler: ReporterScheduler,
    builder: ReportBuilder,
    proofs: RwLock<ProofPool>,
    peer_submissions: RwLock<HashMap<BundleId, Vec<(Address, Hash)>>>,
    submitted: RwLock<HashSet<BundleId>>,
    /// Woken on every new proof or peer submission
    activity: Notify,
}

impl<L, U, I> ReportAssembler<L, U, I>
where
    L: Ledger + 'static,
    U: UsageProvider + 'static,
    I: TimeIndexApi + 'static,
{
    pub fn new(
        config: AssemblerConfig,
        signer: Arc<dyn ReportSigner>,
        ledger: Arc<L>,
        usage: Arc<U>,
        time_index: Arc<I>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            scheduler: ReporterScheduler::new(config.scheduler.clone()),
            builder: ReportBuilder::new(config.fees.clone()),
            config,
            signer,
            ledger,
            usage,
            time_index,
            publisher,
            time: Arc::new(SystemTimeSource),
            codec: ReportCodec::default(),
            proofs: RwLock::new(ProofPool::new()),
            peer_submissions: RwLock::new(HashMap::new()),
            submitted: RwLock::new(HashSet::new()),
            activity: Notify::new(),
        }
    }

    pub fn with_codec(mut self, codec: ReportCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    pub fn local_address(&self) -> Address {
        self.signer.address()
    }

    pub fn codec(&self) -> &ReportCodec {
        &self.codec
    }

    /// Events the assembler reacts to.
    pub fn subscription_filter() -> EventFilter {
        EventFilter::topics(vec![
            EventTopic::Proofs,
            EventTopic::Submissions,
            EventTopic::Ledger,
        ])
    }

    /// Feed bus events into the assembler until shutdown or bus close.
    pub async fn run_event_loop(&self, mut subscription: Subscription, shutdown: Shutdown) {
        loop {
            let event = tokio::select! {
                event = subscription.recv() => event,
                _ = shutdown.cancelled() => break,
            };
            let Some(event) = event else {
                debug!("Event bus closed, stopping assembler event loop");
                break;
            };
            let lost = subscription.take_lagged();
            if lost > 0 {
                metrics::record_events_lagged(lost);
                warn!(
                    lost,
                    next_bundle_id = ?event.bundle_id(),
                    "Assembler missed bus events, gossiped proofs may be absent"
                );
            }
            self.handle_event(event);
        }
    }

    pub fn handle_event(&self, event: ReportEvent) {
        match event {
            ReportEvent::ProofGossiped { bundle_id, proof } => {
                self.receive_proof_inner(&bundle_id, proof);
            }
            ReportEvent::ReportSubmitted {
                bundle_id,
                reporter,
                hash,
            } => self.receive_peer_submission_inner(&bundle_id, reporter, hash),
            ReportEvent::ReportAccepted { bundle_id } => {
                info!(bundle_id = %bundle_id, "Ledger accepted report");
            }
            ReportEvent::ReportProcessed { bundle_id } => {
                let dropped = self.proofs.write().remove(&bundle_id);
                debug!(bundle_id = %bundle_id, dropped, "Bundle settled, proofs released");
            }
            _ => {}
        }
    }

    /// Run bundles from `bundles` one at a time, retrying retryable failures.
    pub async fn run_bundles(&self, mut bundles: mpsc::Receiver<Bundle>, shutdown: Shutdown) {
        loop {
            let bundle = tokio::select! {
                bundle = bundles.recv() => bundle,
                _ = shutdown.cancelled() => break,
            };
            let Some(bundle) = bundle else { break };

            let mut backoff = Backoff::new(self.config.retry.backoff.clone());
            loop {
                match self.run_bundle_inner(&bundle, &shutdown).await {
                    Ok(_) | Err(AssemblerError::AlreadySubmitted { .. }) => break,
                    Err(AssemblerError::Cancelled) => return,
                    Err(e)
                        if e.is_retryable()
                            && backoff.attempts() + 1 < self.config.retry.max_attempts =>
                    {
                        let delay = backoff.next_delay();
                        warn!(bundle_id = %bundle.id, error = %e, delay_ms = delay.as_millis() as u64, "Bundle failed, retrying");
                        if !sleep_or_cancel(delay, &shutdown).await {
                            return;
                        }
                    }
                    Err(e) => {
                        error!(bundle_id = %bundle.id, error = %e, "Bundle abandoned");
                        break;
                    }
                }
            }
        }
    }

    async fn run_bundle_inner(&self, bundle: &Bundle, shutdown: &Shutdown) -> AssemblerResult<Outcome> {
        let started = Instant::now();
        let result = self.assemble(bundle, shutdown).await;

        match &result {
            Ok(outcome) => {
                self.peer_submissions.write().remove(&bundle.id);
                metrics::record_bundle_outcome(if outcome.is_submitted() {
                    "submitted"
                } else {
                    "abstained"
                });
            }
            Err(e) if e.is_fatal() => {
                metrics::record_bundle_outcome(e.kind());
                error!(bundle_id = %bundle.id, error = %e, "Bundle halted, operator attention required");
                self.publisher
                    .publish(ReportEvent::critical(
                        "report-assembler",
                        Some(bundle.id.clone()),
                        e,
                    ))
                    .await;
            }
            Err(e) => {
                metrics::record_bundle_outcome(e.kind());
                warn!(bundle_id = %bundle.id, error = %e, "Bundle did not complete");
            }
        }
        metrics::record_bundle_duration(started.elapsed().as_secs_f64());
        result
    }

    async fn assemble(&self, bundle: &Bundle, shutdown: &Shutdown) -> AssemblerResult<Outcome> {
        let local = self.signer.address();
        if self.is_submitted_inner(&bundle.id) {
            return Err(AssemblerError::AlreadySubmitted {
                bundle_id: bundle.id.clone(),
            });
        }

        self.time_index
            .wait_ready(shutdown)
            .await
            .map_err(cancel_aware)?;
        let window = self.resolve_window(bundle).await?;

        let usage = self
            .usage
            .usage_for_window(bundle, window)
            .await
            .map_err(|reason| AssemblerError::Usage {
                bundle_id: bundle.id.clone(),
                reason,
            })?;
        let report = self.builder.build(&bundle.id, window.to, &usage)?;

        let proof = self
            .codec
            .to_proof(&report, self.signer.as_ref(), self.time.now_millis())
            .await?;
        let hash = proof.hash;
        info!(
            bundle_id = %bundle.id,
            height = report.height,
            hash = %hash_to_hex(&hash),
            "Report built"
        );

        self.receive_proof_inner(&bundle.id, proof.clone());
        self.publisher
            .publish(ReportEvent::ProofGossiped {
                bundle_id: bundle.id.clone(),
                proof,
            })
            .await;

        let window_open = Instant::now();
        let view = self
            .retry_ledger(&bundle.id, shutdown, || self.ledger_view(local))
            .await?;
        let plan = self.scheduler.plan(&local, &view, window_open.elapsed())?;

        if let Some(reporter) = self.wait_for_slot(&bundle.id, &hash, plan.wait, shutdown).await? {
            info!(
                bundle_id = %bundle.id,
                reporter = %reporter,
                "Peer submitted an identical report, abstaining"
            );
            return Ok(Outcome::Abstained {
                bundle_id: bundle.id.clone(),
                hash,
                reporter,
            });
        }

        let proofs = self.collect_quorum(&report, &view, shutdown).await?;
        let payload = self.codec.build_payload(&report, &proofs)?;
        let signers = payload.addresses.clone();

        // Only transient failures are resubmitted with the same payload
        let receipt = self
            .retry_ledger(&bundle.id, shutdown, || {
                self.ledger.submit_report(local, payload.clone())
            })
            .await?;

        self.submitted.write().insert(bundle.id.clone());
        info!(
            bundle_id = %bundle.id,
            height = report.height,
            signers = signers.len(),
            slot = plan.slot_index(),
            "Report submitted"
        );

        Ok(Outcome::Submitted {
            bundle_id: bundle.id.clone(),
            hash,
            signers,
            receipt,
        })
    }

    async fn resolve_window(&self, bundle: &Bundle) -> AssemblerResult<HeightWindow> {
        let window = HeightWindow {
            from: self.time_index.find(bundle.from_timestamp).await?,
            to: self.time_index.find(bundle.to_timestamp).await?,
        };
        if !window.is_valid() {
            return Err(AssemblerError::InvalidWindow {
                bundle_id: bundle.id.clone(),
                from: window.from,
                to: window.to,
            });
        }
        debug!(bundle_id = %bundle.id, from = window.from, to = window.to, "Window resolved");
        Ok(window)
    }

    async fn ledger_view(&self, local: Address) -> Result<LedgerView, LedgerError> {
        Ok(LedgerView {
            reporters: self.ledger.get_reporters().await?,
            active_nodes: self.ledger.total_nodes().await?,
            schedule: self.ledger.quorum_schedule().await?,
            stake: self.ledger.stake_of(&local).await?,
            minimum_stake: self.ledger.minimum_stake().await?,
        })
    }

    /// Wait out the slot buffer. Returns the reporter of an identical peer
    /// submission if one is seen first.
    async fn wait_for_slot(
        &self,
        bundle_id: &BundleId,
        local_hash: &Hash,
        wait: Duration,
        shutdown: &Shutdown,
    ) -> AssemblerResult<Option<Address>> {
        let deadline = Instant::now() + wait;
        let local = self.signer.address();
        let mut seen = 0;

        loop {
            let notified = self.activity.notified();

            let submissions = self
                .peer_submissions
                .read()
                .get(bundle_id)
                .map(|s| s[seen.min(s.len())..].to_vec())
                .unwrap_or_default();
            seen += submissions.len();

            for (reporter, hash) in submissions {
                if reporter == local {
                    continue;
                }
                if hash == *local_hash {
                    return Ok(Some(reporter));
                }
                warn!(
                    bundle_id = %bundle_id,
                    reporter = %reporter,
                    peer_hash = %hash_to_hex(&hash),
                    local_hash = %hash_to_hex(local_hash),
                    "Peer submitted a divergent report, keeping local version"
                );
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown.cancelled() => return Err(AssemblerError::Cancelled),
            }
        }
    }

    /// Proofs that attest `report` and come from listed reporters.
    fn verified_proofs(&self, report: &Report, reporters: &[Address]) -> Vec<ProofOfReport> {
        self.proofs
            .read()
            .proofs(&report.id)
            .into_iter()
            .filter(|proof| reporters.contains(&proof.address))
            .filter(|proof| match self.codec.verify_proof(report, proof) {
                Ok(()) => true,
                Err(e) => {
                    debug!(bundle_id = %report.id, signer = %proof.address, error = %e, "Proof does not match local report");
                    false
                }
            })
            .collect()
    }

    async fn collect_quorum(
        &self,
        report: &Report,
        view: &LedgerView,
        shutdown: &Shutdown,
    ) -> AssemblerResult<Vec<ProofOfReport>> {
        let deadline = Instant::now() + self.config.quorum_timeout;

        loop {
            let notified = self.activity.notified();
            let proofs = self.verified_proofs(report, &view.reporters);

            match self
                .scheduler
                .check_quorum(proofs.iter().map(|p| &p.address), view)
            {
                Ok(_) => return Ok(proofs),
                Err(e) if Instant::now() >= deadline => return Err(e.into()),
                Err(SchedulerError::QuorumNotMet {
                    signatures,
                    required,
                }) => {
                    debug!(bundle_id = %report.id, signatures, required, "Waiting for signatures");
                }
                Err(e) => return Err(e.into()),
            }

            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown.cancelled() => return Err(AssemblerError::Cancelled),
            }
        }
    }

    async fn retry_ledger<T, F, Fut>(
        &self,
        bundle_id: &BundleId,
        shutdown: &Shutdown,
        mut call: F,
    ) -> AssemblerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut backoff = Backoff::new(self.config.retry.backoff.clone());
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e)
                    if e.is_transient()
                        && backoff.attempts() + 1 < self.config.retry.max_attempts =>
                {
                    let delay = backoff.next_delay();
                    warn!(
                        bundle_id = %bundle_id,
                        error = %e,
                        attempt = backoff.attempts(),
                        "Ledger call failed, retrying"
                    );
                    metrics::record_ledger_retry();
                    if !sleep_or_cancel(delay, shutdown).await {
                        return Err(AssemblerError::Cancelled);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn receive_proof_inner(&self, bundle_id: &BundleId, proof: ProofOfReport) -> bool {
        match recover_signer(&proof.toth, &proof.signature) {
            Ok(signer) if signer == proof.address => {}
            _ => {
                warn!(bundle_id = %bundle_id, claimed = %proof.address, "Dropping proof with forged signer");
                metrics::record_proof("forged");
                return false;
            }
        }

        let signer = proof.address;
        let inserted = self.proofs.write().insert(bundle_id, proof);
        if inserted {
            debug!(bundle_id = %bundle_id, signer = %signer, "Proof received");
            metrics::record_proof("accepted");
            self.activity.notify_waiters();
        } else {
            metrics::record_proof("duplicate");
        }
        inserted
    }

    fn receive_peer_submission_inner(&self, bundle_id: &BundleId, reporter: Address, hash: Hash) {
        self.peer_submissions
            .write()
            .entry(bundle_id.clone())
            .or_default()
            .push((reporter, hash));
        self.activity.notify_waiters();
    }

    fn is_submitted_inner(&self, bundle_id: &BundleId) -> bool {
        self.submitted.read().contains(bundle_id)
    }
}

fn cancel_aware(e: TimeIndexError) -> AssemblerError {
    match e {
        TimeIndexError::Cancelled => AssemblerError::Cancelled,
        other => other.into(),
    }
}

async fn sleep_or_cancel(delay: Duration, shutdown: &Shutdown) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.cancelled() => false,
    }
}

#[async_trait]
impl<L, U, I> ReportAssemblerApi for ReportAssembler<L, U, I>
where
    L: Ledger + 'static,
    U: UsageProvider + 'static,
    I: TimeIndexApi + 'static,
{
    async fn run_bundle(&self, bundle: &Bundle, shutdown: &Shutdown) -> AssemblerResult<Outcome> {
        self.run_bundle_inner(bundle, shutdown).await
    }

    fn receive_proof(&self, bundle_id: &BundleId, proof: ProofOfReport) -> bool {
        self.receive_proof_inner(bundle_id, proof)
    }

    fn receive_peer_submission(&self, bundle_id: &BundleId, reporter: Address, hash: Hash) {
        self.receive_peer_submission_inner(bundle_id, reporter, hash)
    }

    fn is_submitted(&self, bundle_id: &BundleId) -> bool {
        self.is_submitted_inner(bundle_id)
    }
}
