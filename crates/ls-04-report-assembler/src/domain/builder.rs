//! Report construction from usage aggregates.
//!
//! ```text
//! capture(stream)   = bytes stored  × write fee
//! capture(consumer) = bytes queried × read fee
//! treasury          = treasury share of Σ capture + rounding dust
//! node              = rest × bytes served / Σ bytes served
//! delegator         = node × stake / Σ stake   (dust to the node itself)
//! ```
//!
//! Every division floors, and the remainder goes to the treasury (nodes) or
//! to the node's own delegation (delegators), so `Σ capture = treasury + Σ
//! nodes` and `Σ delegates[n] = nodes[n]` hold exactly.

use super::usage::UsageAggregates;
use crate::error::{AssemblerError, AssemblerResult};
use ls_02_report_codec::{ConsumerUsage, Report, StreamUsage};
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockHeight, BundleId};
use std::collections::BTreeMap;

const BPS_DENOMINATOR: i128 = 10_000;

/// Fee schedule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Amount captured per stored byte
    pub write_fee_per_byte: i128,
    /// Amount captured per queried byte
    pub read_fee_per_byte: i128,
    /// Treasury share of total capture, in basis points
    pub treasury_share_bps: u32,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            write_fee_per_byte: 1,
            read_fee_per_byte: 1,
            treasury_share_bps: 1_000,
        }
    }
}

fn mul_div(amount: i128, part: i128, whole: i128) -> Option<i128> {
    amount.checked_mul(part)?.checked_div(whole)
}

/// Split `share` across `node`'s delegators by stake.
fn split_delegations(
    node: Address,
    share: i128,
    delegations: Option<&BTreeMap<Address, u128>>,
) -> Option<BTreeMap<Address, i128>> {
    let stakes = delegations
        .into_iter()
        .flatten()
        .filter(|(_, stake)| **stake > 0)
        .map(|(delegator, stake)| i128::try_from(*stake).ok().map(|s| (*delegator, s)))
        .collect::<Option<Vec<_>>>()?;

    let total_stake = stakes
        .iter()
        .try_fold(0i128, |acc, (_, stake)| acc.checked_add(*stake))?;
    if total_stake == 0 {
        return Some(BTreeMap::from([(node, share)]));
    }

    let mut split = BTreeMap::new();
    let mut assigned = 0i128;
    for (delegator, stake) in stakes {
        let part = mul_div(share, stake, total_stake)?;
        split.insert(delegator, part);
        assigned += part;
    }

    let dust = share - assigned;
    if dust != 0 {
        *split.entry(node).or_insert(0) += dust;
    }
    Some(split)
}

/// Builds a report for one bundle from its usage.
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    fees: FeeConfig,
}

impl ReportBuilder {
    pub fn new(fees: FeeConfig) -> Self {
        Self { fees }
    }

    pub fn fees(&self) -> &FeeConfig {
        &self.fees
    }

    pub fn build(
        &self,
        bundle_id: &BundleId,
        height: BlockHeight,
        usage: &UsageAggregates,
    ) -> AssemblerResult<Report> {
        let overflow = || AssemblerError::AmountOverflow {
            bundle_id: bundle_id.clone(),
        };

        let mut report = Report::new(bundle_id.clone(), height);
        let mut total = 0i128;

        for (id, bytes) in &usage.streams {
            let capture = i128::from(*bytes)
                .checked_mul(self.fees.write_fee_per_byte)
                .ok_or_else(overflow)?;
            total = total.checked_add(capture).ok_or_else(overflow)?;
            report.streams.push(StreamUsage {
                id: id.clone(),
                capture,
                bytes: *bytes,
            });
        }

        for (consumer, bytes) in &usage.consumers {
            let capture = i128::from(*bytes)
                .checked_mul(self.fees.read_fee_per_byte)
                .ok_or_else(overflow)?;
            total = total.checked_add(capture).ok_or_else(overflow)?;
            report.consumers.push(ConsumerUsage {
                id: *consumer,
                capture,
                bytes: *bytes,
            });
        }

        let treasury_base = mul_div(
            total,
            i128::from(self.fees.treasury_share_bps),
            BPS_DENOMINATOR,
        )
        .ok_or_else(overflow)?;
        let distributable = total - treasury_base;

        let served = i128::try_from(usage.bytes_served()).map_err(|_| overflow())?;
        let mut distributed = 0i128;
        if served > 0 {
            for (node, bytes) in usage.nodes.iter().filter(|(_, b)| **b > 0) {
                let share =
                    mul_div(distributable, i128::from(*bytes), served).ok_or_else(overflow)?;
                let delegates = split_delegations(*node, share, usage.delegations.get(node))
                    .ok_or_else(overflow)?;

                report.nodes.insert(*node, share);
                report.delegates.insert(*node, delegates);
                distributed += share;
            }
        }

        report.treasury = total - distributed;
        report.events = usage.events.clone();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn assert_balanced(report: &Report) {
        let nodes: i128 = report.nodes.values().sum();
        assert_eq!(report.total_capture(), report.treasury + nodes);
        for (node, share) in &report.nodes {
            let delegated: i128 = report.delegates[node].values().sum();
            assert_eq!(delegated, *share, "delegations of {} do not add up", node);
        }
    }

    #[test]
    fn test_builds_expected_amounts() {
        let usage = UsageAggregates {
            streams: BTreeMap::from([("s".to_string(), 100)]),
            consumers: BTreeMap::from([(addr(0xC0), 50)]),
            nodes: BTreeMap::from([(addr(1), 2), (addr(2), 1)]),
            delegations: BTreeMap::from([(addr(1), BTreeMap::from([(addr(0xD1), 1), (addr(0xD2), 2)]))]),
            events: None,
        };
        let report = ReportBuilder::default()
            .build(&BundleId::new("75"), 2000, &usage)
            .unwrap();

        assert_eq!(report.height, 2000);
        assert_eq!(report.streams[0].capture, 100);
        assert_eq!(report.consumers[0].capture, 50);
        assert_eq!(report.treasury, 15);
        assert_eq!(report.nodes[&addr(1)], 90);
        assert_eq!(report.nodes[&addr(2)], 45);
        assert_eq!(report.delegates[&addr(1)][&addr(0xD1)], 30);
        assert_eq!(report.delegates[&addr(1)][&addr(0xD2)], 60);
        // No delegations: the node self-delegates
        assert_eq!(report.delegates[&addr(2)], BTreeMap::from([(addr(2), 45)]));
        assert_balanced(&report);
    }

    #[test]
    fn test_rounding_dust_goes_to_treasury_and_node() {
        let fees = FeeConfig {
            write_fee_per_byte: 1,
            read_fee_per_byte: 1,
            treasury_share_bps: 0,
        };
        let usage = UsageAggregates {
            streams: BTreeMap::from([("s".to_string(), 100)]),
            nodes: BTreeMap::from([(addr(1), 1), (addr(2), 1), (addr(3), 1)]),
            delegations: BTreeMap::from([(addr(1), BTreeMap::from([(addr(0xD1), 1), (addr(0xD2), 1)]))]),
            ..Default::default()
        };
        let report = ReportBuilder::new(fees)
            .build(&BundleId::new("76"), 10, &usage)
            .unwrap();

        assert_eq!(report.treasury, 1);
        assert_eq!(report.nodes[&addr(1)], 33);
        assert_eq!(report.delegates[&addr(1)][&addr(0xD1)], 16);
        assert_eq!(report.delegates[&addr(1)][&addr(1)], 1);
        assert_balanced(&report);
    }

    #[test]
    fn test_no_served_bytes_sends_everything_to_treasury() {
        let usage = UsageAggregates {
            consumers: BTreeMap::from([(addr(0xC0), 7)]),
            nodes: BTreeMap::from([(addr(1), 0)]),
            ..Default::default()
        };
        let report = ReportBuilder::default()
            .build(&BundleId::new("77"), 1, &usage)
            .unwrap();

        assert_eq!(report.treasury, 7);
        assert!(report.nodes.is_empty());
        assert_balanced(&report);
    }

    #[test]
    fn test_sums_hold_for_uneven_fees() {
        let fees = FeeConfig {
            write_fee_per_byte: 7,
            read_fee_per_byte: 13,
            treasury_share_bps: 333,
        };
        let usage = UsageAggregates {
            streams: BTreeMap::from([("a".to_string(), 997), ("b".to_string(), 3)]),
            consumers: BTreeMap::from([(addr(0xC0), 101), (addr(0xC1), 59)]),
            nodes: BTreeMap::from([(addr(1), 17), (addr(2), 5), (addr(3), 11)]),
            delegations: BTreeMap::from([
                (addr(1), BTreeMap::from([(addr(0xD1), 3), (addr(0xD2), 7), (addr(1), 1)])),
                (addr(3), BTreeMap::from([(addr(0xD3), 0)])),
            ]),
            events: None,
        };
        let report = ReportBuilder::new(fees)
            .build(&BundleId::new("78"), 99, &usage)
            .unwrap();
        assert_balanced(&report);
        assert_eq!(report.delegates[&addr(3)], BTreeMap::from([(addr(3), report.nodes[&addr(3)])]));
    }

    #[test]
    fn test_overflow_is_reported() {
        let fees = FeeConfig {
            write_fee_per_byte: i128::MAX,
            ..Default::default()
        };
        let usage = UsageAggregates {
            streams: BTreeMap::from([("s".to_string(), 2)]),
            ..Default::default()
        };
        assert!(matches!(
            ReportBuilder::new(fees).build(&BundleId::new("79"), 1, &usage),
            Err(AssemblerError::AmountOverflow { .. })
        ));
    }
}
