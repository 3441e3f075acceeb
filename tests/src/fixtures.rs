//! Shared test fixtures.

use async_trait::async_trait;
use ls_01_time_index::{ChainDataSource, TimeIndexResult};
use ls_04_report_assembler::{Bundle, HeightWindow, TimeSource, UsageAggregates, UsageProvider};
use parking_lot::Mutex;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, BlockHeight, ChainBlock, SourceId, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Chain-data source serving a fixed block list.
pub struct ScriptedSource {
    id: SourceId,
    head: BlockHeight,
    blocks: BTreeMap<BlockHeight, ChainBlock>,
    pub requests: Mutex<Vec<(BlockHeight, BlockHeight)>>,
}

impl ScriptedSource {
    /// Blocks `0..=head` with `timestamp_of(n)` as their timestamps.
    pub fn new(id: &str, head: BlockHeight, timestamp_of: impl Fn(BlockHeight) -> Timestamp) -> Self {
        Self {
            id: SourceId::new(id),
            head,
            blocks: (0..=head)
                .map(|n| (n, ChainBlock::new(n, timestamp_of(n))))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replace one block's timestamp.
    pub fn with_block(mut self, number: BlockHeight, timestamp: Timestamp) -> Self {
        self.blocks.insert(number, ChainBlock::new(number, timestamp));
        self
    }

    pub fn shared(self) -> Arc<dyn ChainDataSource> {
        Arc::new(self)
    }
}

#[async_trait]
impl ChainDataSource for ScriptedSource {
    fn id(&self) -> SourceId {
        self.id.clone()
    }

    async fn head_number(&self) -> TimeIndexResult<BlockHeight> {
        Ok(self.head)
    }

    async fn fetch_blocks(
        &self,
        from: BlockHeight,
        to: BlockHeight,
    ) -> TimeIndexResult<Vec<ChainBlock>> {
        self.requests.lock().push((from, to));
        Ok(self.blocks.range(from..=to).map(|(_, b)| *b).collect())
    }
}

/// Usage proportional to the window length, recording every window asked for.
#[derive(Default)]
pub struct WindowUsage {
    pub windows: Mutex<Vec<HeightWindow>>,
}

impl WindowUsage {
    pub fn aggregates(window: HeightWindow) -> UsageAggregates {
        UsageAggregates {
            streams: BTreeMap::from([("stream-1".to_string(), window.len() * 10)]),
            consumers: BTreeMap::from([(Address([0xC0; 20]), window.len())]),
            nodes: BTreeMap::from([(Address([0x01; 20]), 2), (Address([0x02; 20]), 1)]),
            delegations: BTreeMap::from([(
                Address([0x01; 20]),
                BTreeMap::from([(Address([0xD1; 20]), 1), (Address([0xD2; 20]), 3)]),
            )]),
            events: None,
        }
    }
}

#[async_trait]
impl UsageProvider for WindowUsage {
    async fn usage_for_window(
        &self,
        _bundle: &Bundle,
        window: HeightWindow,
    ) -> Result<UsageAggregates, String> {
        self.windows.lock().push(window);
        Ok(Self::aggregates(window))
    }
}

pub struct FixedClock(pub u64);

impl TimeSource for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Reporter keys in ledger order.
pub struct ReporterSet {
    pub keys: Vec<Arc<Secp256k1KeyPair>>,
}

impl ReporterSet {
    pub fn generate(count: usize) -> Self {
        Self {
            keys: (0..count)
                .map(|_| Arc::new(Secp256k1KeyPair::generate()))
                .collect(),
        }
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.iter().map(|k| k.address()).collect()
    }
}
