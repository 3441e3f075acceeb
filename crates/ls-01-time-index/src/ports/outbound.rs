//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::TimeIndexEntry;
use crate::error::TimeIndexResult;
use async_trait::async_trait;
use shared_types::{BlockHeight, ChainBlock, SourceId, Timestamp};

/// Ordered persisted index keyed by timestamp.
///
/// Production: `RocksDbTimeIndexStore` (feature `rocksdb`)
/// Testing: `InMemoryTimeIndexStore`
///
/// Writes are single-key and become visible only once complete; the
/// indexer serializes read-decide-write sequences itself.
pub trait TimeIndexStore: Send + Sync {
    /// Entry stored under exactly `timestamp`.
    fn get(&self, timestamp: Timestamp) -> TimeIndexResult<Option<TimeIndexEntry>>;

    /// Insert or replace the entry for `entry.timestamp`.
    fn put(&self, entry: &TimeIndexEntry) -> TimeIndexResult<()>;

    /// Entries with `from <= timestamp <= to`, ascending.
    fn range(&self, from: Timestamp, to: Timestamp) -> TimeIndexResult<Vec<TimeIndexEntry>>;

    /// Entry with the largest timestamp.
    fn last(&self) -> TimeIndexResult<Option<TimeIndexEntry>>;

    /// Last block a source finished syncing.
    fn cursor(&self, source: &SourceId) -> TimeIndexResult<Option<BlockHeight>>;

    /// Record the last block a source finished syncing.
    fn set_cursor(&self, source: &SourceId, height: BlockHeight) -> TimeIndexResult<()>;
}

/// An independent chain-data provider (typically one RPC endpoint).
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Stable identifier of this source.
    fn id(&self) -> SourceId;

    /// Current chain head.
    async fn head_number(&self) -> TimeIndexResult<BlockHeight>;

    /// Blocks `from..=to`, ascending.
    async fn fetch_blocks(
        &self,
        from: BlockHeight,
        to: BlockHeight,
    ) -> TimeIndexResult<Vec<ChainBlock>>;
}

/// Ledger-side facts used to choose where a fresh index starts.
#[async_trait]
pub trait StartHeightResolver: Send + Sync {
    /// Height of the last accepted report, if any.
    async fn last_report_height(&self) -> TimeIndexResult<Option<BlockHeight>>;

    /// Network-wide genesis (start block) height.
    async fn genesis_height(&self) -> TimeIndexResult<BlockHeight>;
}
