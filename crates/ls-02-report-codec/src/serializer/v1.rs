//! Version 1 report layout.
//!
//! Every amount travels as a hex quantity string so the JSON form is safe for
//! any integer width.

use super::{ReportSerializer, SerializedReport};
use crate::domain::{
    parse_hex_quantity, to_hex_quantity, ConsumerUsage, ContractParams, Report, ReportEvents,
    ReportVersion, StreamUsage,
};
use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Address, BlockHeight, BundleId};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize)]
struct StreamWire {
    id: String,
    capture: String,
    bytes: u64,
}

#[derive(Serialize, Deserialize)]
struct ConsumerWire {
    id: Address,
    capture: String,
    bytes: u64,
}

#[derive(Serialize, Deserialize)]
struct ReportWire {
    id: String,
    height: BlockHeight,
    treasury: String,
    streams: Vec<StreamWire>,
    consumers: Vec<ConsumerWire>,
    nodes: BTreeMap<Address, String>,
    delegates: BTreeMap<Address, BTreeMap<Address, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    events: Option<ReportEvents>,
}

fn hex_map(values: &BTreeMap<Address, i128>) -> BTreeMap<Address, String> {
    values
        .iter()
        .map(|(address, amount)| (*address, to_hex_quantity(*amount)))
        .collect()
}

fn parse_map(values: BTreeMap<Address, String>) -> CodecResult<BTreeMap<Address, i128>> {
    values
        .into_iter()
        .map(|(address, amount)| Ok((address, parse_hex_quantity(&amount)?)))
        .collect()
}

/// Version 1 serializer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportSerializerV1;

impl ReportSerializer for ReportSerializerV1 {
    fn version(&self) -> ReportVersion {
        ReportVersion::V1
    }

    fn serialize(&self, report: &Report) -> CodecResult<SerializedReport> {
        let wire = ReportWire {
            id: report.id.as_str().to_string(),
            height: report.height,
            treasury: to_hex_quantity(report.treasury),
            streams: report
                .streams
                .iter()
                .map(|s| StreamWire {
                    id: s.id.clone(),
                    capture: to_hex_quantity(s.capture),
                    bytes: s.bytes,
                })
                .collect(),
            consumers: report
                .consumers
                .iter()
                .map(|c| ConsumerWire {
                    id: c.id,
                    capture: to_hex_quantity(c.capture),
                    bytes: c.bytes,
                })
                .collect(),
            nodes: hex_map(&report.nodes),
            delegates: report
                .delegates
                .iter()
                .map(|(node, delegators)| (*node, hex_map(delegators)))
                .collect(),
            events: report.events.clone(),
        };

        match serde_json::to_value(wire)? {
            Value::Object(body) => Ok(SerializedReport {
                v: self.version().as_number(),
                s: true,
                body,
            }),
            other => Err(CodecError::Encoding(format!(
                "report body rendered as {}",
                other
            ))),
        }
    }

    fn deserialize(&self, form: &SerializedReport) -> CodecResult<Report> {
        let wire: ReportWire = serde_json::from_value(Value::Object(form.body.clone()))
            .map_err(|e| CodecError::invalid_payload(e.to_string()))?;

        let streams = wire
            .streams
            .into_iter()
            .map(|s| {
                Ok(StreamUsage {
                    id: s.id,
                    capture: parse_hex_quantity(&s.capture)?,
                    bytes: s.bytes,
                })
            })
            .collect::<CodecResult<Vec<_>>>()?;

        let consumers = wire
            .consumers
            .into_iter()
            .map(|c| {
                Ok(ConsumerUsage {
                    id: c.id,
                    capture: parse_hex_quantity(&c.capture)?,
                    bytes: c.bytes,
                })
            })
            .collect::<CodecResult<Vec<_>>>()?;

        let delegates = wire
            .delegates
            .into_iter()
            .map(|(node, delegators)| Ok((node, parse_map(delegators)?)))
            .collect::<CodecResult<BTreeMap<_, _>>>()?;

        Ok(Report {
            version: ReportVersion::V1,
            id: BundleId::new(wire.id),
            height: wire.height,
            treasury: parse_hex_quantity(&wire.treasury)?,
            streams,
            consumers,
            nodes: parse_map(wire.nodes)?,
            delegates,
            events: wire.events,
        })
    }

    fn to_contract(&self, report: &Report) -> CodecResult<ContractParams> {
        let mut delegate_nodes = Vec::with_capacity(report.delegates.len());
        let mut delegators = Vec::with_capacity(report.delegates.len());
        let mut delegate_changes = Vec::with_capacity(report.delegates.len());
        for (node, stakes) in &report.delegates {
            delegate_nodes.push(*node);
            delegators.push(stakes.keys().copied().collect());
            delegate_changes.push(stakes.values().copied().collect());
        }

        Ok(ContractParams {
            id: report.id.as_str().to_string(),
            height: report.height,
            stream_ids: report.streams.iter().map(|s| s.id.clone()).collect(),
            write_captures: report.streams.iter().map(|s| s.capture).collect(),
            write_bytes: report.streams.iter().map(|s| s.bytes).collect(),
            consumers: report.consumers.iter().map(|c| c.id).collect(),
            read_captures: report.consumers.iter().map(|c| c.capture).collect(),
            read_bytes: report.consumers.iter().map(|c| c.bytes).collect(),
            nodes: report.nodes.keys().copied().collect(),
            node_changes: report.nodes.values().copied().collect(),
            delegate_nodes,
            delegators,
            delegate_changes,
            treasury_change: report.treasury,
        })
    }
}
