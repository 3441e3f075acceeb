//! In-memory adapters for tests and single-process deployments.

use crate::domain::TimeIndexEntry;
use crate::error::TimeIndexResult;
use crate::ports::outbound::{StartHeightResolver, TimeIndexStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{BlockHeight, SourceId, Timestamp};
use std::collections::{BTreeMap, HashMap};

/// `BTreeMap`-backed index store.
#[derive(Debug, Default)]
pub struct InMemoryTimeIndexStore {
    entries: RwLock<BTreeMap<Timestamp, TimeIndexEntry>>,
    cursors: RwLock<HashMap<SourceId, BlockHeight>>,
}

impl InMemoryTimeIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TimeIndexStore for InMemoryTimeIndexStore {
    fn get(&self, timestamp: Timestamp) -> TimeIndexResult<Option<TimeIndexEntry>> {
        Ok(self.entries.read().get(&timestamp).cloned())
    }

    fn put(&self, entry: &TimeIndexEntry) -> TimeIndexResult<()> {
        self.entries.write().insert(entry.timestamp, entry.clone());
        Ok(())
    }

    fn range(&self, from: Timestamp, to: Timestamp) -> TimeIndexResult<Vec<TimeIndexEntry>> {
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .entries
            .read()
            .range(from..=to)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    fn last(&self) -> TimeIndexResult<Option<TimeIndexEntry>> {
        Ok(self.entries.read().values().next_back().cloned())
    }

    fn cursor(&self, source: &SourceId) -> TimeIndexResult<Option<BlockHeight>> {
        Ok(self.cursors.read().get(source).copied())
    }

    fn set_cursor(&self, source: &SourceId, height: BlockHeight) -> TimeIndexResult<()> {
        self.cursors.write().insert(source.clone(), height);
        Ok(())
    }
}

/// Static start-height facts.
#[derive(Debug, Clone, Default)]
pub struct FixedStartHeight {
    pub last_report_height: Option<BlockHeight>,
    pub genesis_height: BlockHeight,
}

#[async_trait]
impl StartHeightResolver for FixedStartHeight {
    async fn last_report_height(&self) -> TimeIndexResult<Option<BlockHeight>> {
        Ok(self.last_report_height)
    }

    async fn genesis_height(&self) -> TimeIndexResult<BlockHeight> {
        Ok(self.genesis_height)
    }
}
