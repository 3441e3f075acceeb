//! Usage aggregates for one window.

use ls_02_report_codec::ReportEvents;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeMap;

/// Read-only usage totals reported by the storage and query collaborators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageAggregates {
    /// Bytes stored per stream
    pub streams: BTreeMap<String, u64>,
    /// Bytes queried per consumer
    pub consumers: BTreeMap<Address, u64>,
    /// Bytes served per node
    pub nodes: BTreeMap<Address, u64>,
    /// Delegated stake per node, per delegator
    pub delegations: BTreeMap<Address, BTreeMap<Address, u128>>,
    /// Diagnostic events copied onto the report
    pub events: Option<ReportEvents>,
}

impl UsageAggregates {
    pub fn bytes_served(&self) -> u128 {
        self.nodes.values().map(|b| u128::from(*b)).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.streams.values().all(|b| *b == 0) && self.consumers.values().all(|b| *b == 0)
    }
}
