//! Driving Ports (API - Inbound)

use crate::domain::{IndexerState, TimeIndexEntry};
use crate::error::TimeIndexResult;
use async_trait::async_trait;
use shared_bus::Shutdown;
use shared_types::{BlockHeight, Timestamp};

/// Primary Time Index API
///
/// Consumed by the report assembler to bound report windows.
#[async_trait]
pub trait TimeIndexApi: Send + Sync {
    /// Block height for `timestamp`.
    ///
    /// `0` maps to `0`. An exact entry wins; otherwise the nearest entry
    /// within the scan buffer (ties prefer the larger height).
    async fn find(&self, timestamp: Timestamp) -> TimeIndexResult<BlockHeight>;

    /// Like `find`, returning the full entry with its agreeing sources.
    async fn find_entry(&self, timestamp: Timestamp) -> TimeIndexResult<TimeIndexEntry>;

    /// Current lifecycle state.
    fn state(&self) -> IndexerState;

    /// Whether every source has caught up at least once.
    fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Resolve once Ready; fail if the indexer halts or `shutdown` fires.
    async fn wait_ready(&self, shutdown: &Shutdown) -> TimeIndexResult<()>;

    /// Newest indexed timestamp.
    async fn latest_timestamp(&self) -> TimeIndexResult<Option<Timestamp>>;
}
