//! Quorum thresholds as published by the ledger.

use crate::error::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;

/// From `min_active_nodes` active nodes upward, `required_signatures` are needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumTier {
    pub min_active_nodes: u64,
    pub required_signatures: usize,
}

/// Ledger-owned quorum schedule.
///
/// Tiers are non-empty and strictly ascending by `min_active_nodes`. A network
/// smaller than the first tier has no threshold; the ledger is expected to
/// publish a tier starting at zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QuorumTier>", into = "Vec<QuorumTier>")]
pub struct QuorumSchedule {
    tiers: Vec<QuorumTier>,
}

impl QuorumSchedule {
    pub fn new(tiers: Vec<QuorumTier>) -> SchedulerResult<Self> {
        if tiers.is_empty() {
            return Err(SchedulerError::InvalidSchedule {
                reason: "no tiers".into(),
            });
        }
        if let Some(pair) = tiers
            .windows(2)
            .find(|pair| pair[0].min_active_nodes >= pair[1].min_active_nodes)
        {
            return Err(SchedulerError::InvalidSchedule {
                reason: format!(
                    "tier at {} nodes follows tier at {} nodes",
                    pair[1].min_active_nodes, pair[0].min_active_nodes
                ),
            });
        }
        if tiers.iter().any(|t| t.required_signatures == 0) {
            return Err(SchedulerError::InvalidSchedule {
                reason: "a tier requires zero signatures".into(),
            });
        }
        Ok(Self { tiers })
    }

    /// Same threshold at every network size.
    pub fn fixed(required_signatures: usize) -> Self {
        Self {
            tiers: vec![QuorumTier {
                min_active_nodes: 0,
                required_signatures: required_signatures.max(1),
            }],
        }
    }

    pub fn tiers(&self) -> &[QuorumTier] {
        &self.tiers
    }

    /// Signatures required with `active_nodes` active nodes.
    pub fn required_for(&self, active_nodes: u64) -> SchedulerResult<usize> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.min_active_nodes <= active_nodes)
            .map(|tier| tier.required_signatures)
            .ok_or(SchedulerError::NoQuorumTier { active_nodes })
    }
}

impl TryFrom<Vec<QuorumTier>> for QuorumSchedule {
    type Error = SchedulerError;

    fn try_from(tiers: Vec<QuorumTier>) -> SchedulerResult<Self> {
        Self::new(tiers)
    }
}

impl From<QuorumSchedule> for Vec<QuorumTier> {
    fn from(schedule: QuorumSchedule) -> Self {
        schedule.tiers
    }
}

/// Distinct authorized signers among `signers`.
pub fn tally<'a>(signers: impl IntoIterator<Item = &'a Address>, reporters: &[Address]) -> usize {
    signers
        .into_iter()
        .filter(|signer| reporters.contains(signer))
        .collect::<BTreeSet<_>>()
        .len()
}
