//! Time Index Service - source sync loops and lookups
//!
//! One tokio task per chain-data source streams finalized `{number,
//! timestamp}` pairs into the shared index. Every observation is merged
//! under a single writer lock (read, decide, write); lookups never take it.

use crate::domain::{
    merge, nearest, scan_window, Backoff, BackoffConfig, IndexerEvent, IndexerState,
    MergeOutcome, Observation, TimeIndexEntry,
};
use crate::error::{TimeIndexError, TimeIndexResult};
use crate::metrics;
use crate::ports::inbound::TimeIndexApi;
use crate::ports::outbound::{ChainDataSource, StartHeightResolver, TimeIndexStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, ReportEvent, Shutdown};
use shared_types::{BlockHeight, SourceId, Timestamp};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Time index configuration
#[derive(Clone, Debug)]
pub struct TimeIndexConfig {
    /// Trailing blocks never trusted (`head - confirmations` is the newest synced block)
    pub confirmations: u64,
    /// Half-width of the nearest-timestamp scan window
    pub scan_buffer: u64,
    /// Wait between polls once a source has caught up
    pub poll_interval: Duration,
    /// Blocks fetched per request
    pub batch_size: u64,
    /// Retry policy for transient source and store failures
    pub backoff: BackoffConfig,
}

impl Default for TimeIndexConfig {
    fn default() -> Self {
        Self {
            confirmations: 128,
            scan_buffer: 10_000,
            poll_interval: Duration::from_secs(10),
            batch_size: 10,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Progress of one sync step for one source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStep {
    /// Blocks up to `to` were merged; more are available
    Advanced { to: BlockHeight },
    /// Nothing further to sync until the head moves
    CaughtUp,
}

/// Time Index service
pub struct TimeIndexer<S, R>
where
    S: TimeIndexStore,
    R: StartHeightResolver,
{
    config: TimeIndexConfig,
    store: Arc<S>,
    resolver: Arc<R>,
    sources: Vec<Arc<dyn ChainDataSource>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    state: watch::Sender<IndexerState>,
    /// Serializes read-decide-write on the store
    writer: Mutex<()>,
    /// Sources that reported "nothing further to sync" at least once
    caught_up: Mutex<HashSet<SourceId>>,
}

impl<S, R> TimeIndexer<S, R>
where
    S: TimeIndexStore + 'static,
    R: StartHeightResolver + 'static,
{
    /// Create new time indexer
    pub fn new(
        config: TimeIndexConfig,
        store: Arc<S>,
        resolver: Arc<R>,
        sources: Vec<Arc<dyn ChainDataSource>>,
    ) -> Self {
        let (state, _) = watch::channel(IndexerState::Uninitialized);
        Self {
            config,
            store,
            resolver,
            sources,
            publisher: None,
            state,
            writer: Mutex::new(()),
            caught_up: Mutex::new(HashSet::new()),
        }
    }

    /// Publish readiness and failure on the event bus.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn config(&self) -> &TimeIndexConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Latest persisted entry, else last accepted report, else genesis.
    pub async fn resolve_start_height(&self) -> TimeIndexResult<BlockHeight> {
        if let Some(entry) = self.store.last()? {
            debug!(height = entry.height, "Resuming from persisted index");
            return Ok(entry.height);
        }
        if let Some(height) = self.resolver.last_report_height().await? {
            debug!(height, "Starting from last report height");
            return Ok(height);
        }
        let genesis = self.resolver.genesis_height().await?;
        debug!(height = genesis, "Starting from genesis height");
        Ok(genesis)
    }

    /// Merge one observation into the index.
    ///
    /// A conflicting height returns `SourceDisagreement` and writes nothing.
    pub fn apply_observation(&self, observation: &Observation) -> TimeIndexResult<MergeOutcome> {
        let _guard = self.writer.lock();

        let existing = self.store.get(observation.timestamp)?;
        let outcome = merge(existing.as_ref(), observation);

        match &outcome {
            MergeOutcome::Created(entry) => {
                self.store.put(entry)?;
                metrics::record_observation("created");
            }
            MergeOutcome::Confirmed(entry) => {
                self.store.put(entry)?;
                metrics::record_observation("confirmed");
            }
            MergeOutcome::AlreadyPresent => metrics::record_observation("duplicate"),
            MergeOutcome::Conflict {
                existing,
                reported_height,
            } => {
                metrics::record_disagreement();
                return Err(TimeIndexError::SourceDisagreement {
                    timestamp: observation.timestamp,
                    existing_height: existing.height,
                    existing_sources: existing.sources.iter().cloned().collect(),
                    source_id: observation.source.clone(),
                    reported_height: *reported_height,
                });
            }
        }
        Ok(outcome)
    }

    /// Bootstrap and spawn one sync task per source.
    pub async fn start(self: &Arc<Self>, shutdown: Shutdown) -> TimeIndexResult<Vec<JoinHandle<()>>> {
        self.transition(IndexerEvent::Start).await;

        let start_height = self.resolve_start_height().await?;
        info!(
            start_height,
            sources = self.sources.len(),
            "Time index bootstrapped"
        );

        self.transition(IndexerEvent::Bootstrapped {
            total_sources: self.sources.len(),
        })
        .await;

        let handles = self
            .sources
            .iter()
            .cloned()
            .map(|source| {
                let indexer = Arc::clone(self);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    let id = source.id();
                    match indexer.run_source(source, start_height, shutdown).await {
                        Ok(()) | Err(TimeIndexError::Cancelled) => {
                            debug!(source = %id, "Source sync stopped");
                        }
                        Err(e) => error!(source = %id, error = %e, "Source sync terminated"),
                    }
                })
            })
            .collect();

        Ok(handles)
    }

    /// First block a source should fetch.
    ///
    /// Its persisted cursor wins; a zero start height means "recent blocks
    /// only" (`head - confirmations`).
    pub async fn initial_height(
        &self,
        source: &dyn ChainDataSource,
        start_height: BlockHeight,
    ) -> TimeIndexResult<BlockHeight> {
        if let Some(cursor) = self.store.cursor(&source.id())? {
            return Ok(cursor.saturating_add(1));
        }
        if start_height > 0 {
            return Ok(start_height);
        }
        let head = source.head_number().await?;
        Ok(head.saturating_sub(self.config.confirmations))
    }

    /// Fetch and merge one batch from `source`, advancing `next`.
    pub async fn sync_step(
        &self,
        source: &dyn ChainDataSource,
        next: &mut BlockHeight,
    ) -> TimeIndexResult<SyncStep> {
        let id = source.id();
        let head = source.head_number().await?;
        let safe = head.saturating_sub(self.config.confirmations);
        if *next > safe {
            return Ok(SyncStep::CaughtUp);
        }

        let from = *next;
        let to = from
            .saturating_add(self.config.batch_size.max(1) - 1)
            .min(safe);
        let blocks = source.fetch_blocks(from, to).await?;

        let mut last = None;
        for block in blocks
            .into_iter()
            .filter(|b| b.number >= from && b.number <= to)
        {
            self.apply_observation(&Observation::from_block(id.clone(), block))?;
            last = last.max(Some(block.number));
        }

        let last = last.ok_or_else(|| TimeIndexError::Source {
            source_id: id.clone(),
            reason: format!("no blocks returned for range {}..={}", from, to),
        })?;

        self.store.set_cursor(&id, last)?;
        metrics::set_source_cursor(id.as_str(), last);
        debug!(source = %id, from, to = last, safe, "Synced batch");

        *next = last + 1;
        if *next > safe {
            Ok(SyncStep::CaughtUp)
        } else {
            Ok(SyncStep::Advanced { to: last })
        }
    }

    async fn run_source(
        &self,
        source: Arc<dyn ChainDataSource>,
        start_height: BlockHeight,
        shutdown: Shutdown,
    ) -> TimeIndexResult<()> {
        let id = source.id();
        let mut backoff = Backoff::new(self.config.backoff.clone());

        let mut next = loop {
            match self.initial_height(source.as_ref(), start_height).await {
                Ok(height) => break height,
                Err(e) => {
                    warn!(source = %id, error = %e, "Failed to resolve source start, retrying");
                    metrics::record_source_error(id.as_str());
                    if !sleep_or_cancel(backoff.next_delay(), &shutdown).await {
                        return Err(TimeIndexError::Cancelled);
                    }
                }
            }
        };
        backoff.reset();
        info!(source = %id, from = next, "Source sync started");

        loop {
            if self.state().is_failed() {
                return Ok(());
            }
            if shutdown.is_cancelled() {
                return Err(TimeIndexError::Cancelled);
            }

            match self.sync_step(source.as_ref(), &mut next).await {
                Ok(SyncStep::Advanced { .. }) => backoff.reset(),
                Ok(SyncStep::CaughtUp) => {
                    backoff.reset();
                    self.mark_caught_up(&id).await;
                    if !sleep_or_cancel(self.config.poll_interval, &shutdown).await {
                        return Err(TimeIndexError::Cancelled);
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(source = %id, error = %e, "Irreconcilable source disagreement, halting time index");
                    self.halt(&e).await;
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        source = %id,
                        error = %e,
                        attempt = backoff.attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Source sync failed, retrying"
                    );
                    metrics::record_source_error(id.as_str());
                    if !sleep_or_cancel(delay, &shutdown).await {
                        return Err(TimeIndexError::Cancelled);
                    }
                }
            }
        }
    }

    async fn mark_caught_up(&self, source: &SourceId) {
        let first = self.caught_up.lock().insert(source.clone());
        if first {
            info!(source = %source, "Source caught up");
            self.transition(IndexerEvent::SourceCaughtUp).await;
        }
    }

    async fn halt(&self, cause: &TimeIndexError) {
        let state = self
            .transition(IndexerEvent::SourceDisagreement {
                reason: cause.to_string(),
            })
            .await;
        if state.is_failed() {
            self.publish(ReportEvent::critical("time-index", None, cause))
                .await;
        }
    }

    async fn transition(&self, event: IndexerEvent) -> IndexerState {
        let mut entered = None;
        self.state.send_if_modified(|state| {
            let next = state.next_state(&event);
            if next == *state {
                return false;
            }
            *state = next.clone();
            entered = Some(next);
            true
        });

        let Some(next) = entered else {
            return self.state();
        };
        debug!(state = ?next, "Time index state changed");

        match &next {
            IndexerState::Ready => {
                let latest_timestamp = self.store.last().ok().flatten().map(|e| e.timestamp);
                info!(latest_timestamp = ?latest_timestamp, "Time index ready");
                self.publish(ReportEvent::TimeIndexReady { latest_timestamp })
                    .await;
            }
            IndexerState::Failed { reason } => {
                self.publish(ReportEvent::TimeIndexFailed {
                    reason: reason.clone(),
                })
                .await;
            }
            _ => {}
        }
        next
    }

    async fn publish(&self, event: ReportEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(event).await;
        }
    }
}

async fn sleep_or_cancel(delay: Duration, shutdown: &Shutdown) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.cancelled() => false,
    }
}

#[async_trait]
impl<S, R> TimeIndexApi for TimeIndexer<S, R>
where
    S: TimeIndexStore + 'static,
    R: StartHeightResolver + 'static,
{
    async fn find(&self, timestamp: Timestamp) -> TimeIndexResult<BlockHeight> {
        self.find_entry(timestamp).await.map(|entry| entry.height)
    }

    async fn find_entry(&self, timestamp: Timestamp) -> TimeIndexResult<TimeIndexEntry> {
        if timestamp == 0 {
            return Ok(TimeIndexEntry::origin());
        }

        let state = self.state();
        if let IndexerState::Failed { reason } = state {
            return Err(TimeIndexError::Failed { reason });
        }
        if !state.is_ready() {
            debug!(timestamp, state = ?state, "Provisional time index lookup");
        }

        if let Some(entry) = self.store.get(timestamp)? {
            return Ok(entry);
        }

        let (from, to) = scan_window(timestamp, self.config.scan_buffer);
        let candidates = self.store.range(from, to)?;
        nearest(&candidates, timestamp)
            .cloned()
            .ok_or(TimeIndexError::TimeIndexLookupFailed { timestamp })
    }

    fn state(&self) -> IndexerState {
        self.state.borrow().clone()
    }

    async fn wait_ready(&self, shutdown: &Shutdown) -> TimeIndexResult<()> {
        let mut receiver = self.state.subscribe();
        let settled = tokio::select! {
            result = receiver.wait_for(IndexerState::is_settled) => {
                result.map(|state| state.clone()).map_err(|_| TimeIndexError::NotReady)
            }
            _ = shutdown.cancelled() => Err(TimeIndexError::Cancelled),
        }?;

        match settled {
            IndexerState::Failed { reason } => Err(TimeIndexError::Failed { reason }),
            _ => Ok(()),
        }
    }

    async fn latest_timestamp(&self) -> TimeIndexResult<Option<Timestamp>> {
        Ok(self.store.last()?.map(|entry| entry.timestamp))
    }
}
