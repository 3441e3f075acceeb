//! Time index entries and the source merge rule.
//!
//! An entry maps one timestamp to one block height together with the set of
//! chain-data sources that agreed on it. Sources may only ever *confirm* an
//! existing height; a different height for the same timestamp is a conflict
//! and nothing is written.

use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, ChainBlock, SourceId, Timestamp};
use std::collections::BTreeSet;

/// `timestamp → {height, agreeing sources}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeIndexEntry {
    pub timestamp: Timestamp,
    pub height: BlockHeight,
    pub sources: BTreeSet<SourceId>,
}

impl TimeIndexEntry {
    /// First observation of `timestamp`.
    pub fn new(timestamp: Timestamp, height: BlockHeight, source: SourceId) -> Self {
        let mut sources = BTreeSet::new();
        sources.insert(source);
        Self {
            timestamp,
            height,
            sources,
        }
    }

    /// Entry used for the `0 → 0` lookup shortcut.
    pub fn origin() -> Self {
        Self {
            timestamp: 0,
            height: 0,
            sources: BTreeSet::new(),
        }
    }

    pub fn agreeing_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn is_confirmed_by(&self, source: &SourceId) -> bool {
        self.sources.contains(source)
    }
}

/// One `{number, timestamp}` pair as reported by a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub source: SourceId,
    pub timestamp: Timestamp,
    pub height: BlockHeight,
}

impl Observation {
    pub fn from_block(source: SourceId, block: ChainBlock) -> Self {
        Self {
            source,
            timestamp: block.timestamp,
            height: block.number,
        }
    }
}

/// Result of merging an observation into the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No entry existed; write this one.
    Created(TimeIndexEntry),
    /// Same height from a new source; write the extended entry.
    Confirmed(TimeIndexEntry),
    /// Same height from a source already recorded; nothing to write.
    AlreadyPresent,
    /// Different height; nothing may be written.
    Conflict {
        existing: TimeIndexEntry,
        reported_height: BlockHeight,
    },
}

impl MergeOutcome {
    /// Entry that must be persisted, if any.
    pub fn entry_to_write(&self) -> Option<&TimeIndexEntry> {
        match self {
            MergeOutcome::Created(entry) | MergeOutcome::Confirmed(entry) => Some(entry),
            MergeOutcome::AlreadyPresent | MergeOutcome::Conflict { .. } => None,
        }
    }
}

/// Apply the merge rule. Pure; the caller persists the outcome.
pub fn merge(existing: Option<&TimeIndexEntry>, observation: &Observation) -> MergeOutcome {
    match existing {
        None => MergeOutcome::Created(TimeIndexEntry::new(
            observation.timestamp,
            observation.height,
            observation.source.clone(),
        )),
        Some(entry) if entry.height != observation.height => MergeOutcome::Conflict {
            existing: entry.clone(),
            reported_height: observation.height,
        },
        Some(entry) if entry.is_confirmed_by(&observation.source) => MergeOutcome::AlreadyPresent,
        Some(entry) => {
            let mut extended = entry.clone();
            extended.sources.insert(observation.source.clone());
            MergeOutcome::Confirmed(extended)
        }
    }
}
