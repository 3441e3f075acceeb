//! The in-memory report.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockHeight, BundleId};
use std::collections::BTreeMap;
use std::fmt;

/// Report format version (`v` tag).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportVersion {
    V1 = 1,
}

impl ReportVersion {
    pub const LATEST: ReportVersion = ReportVersion::V1;

    const ALL: [ReportVersion; 1] = [ReportVersion::V1];

    pub fn from_number(number: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_number() == number)
    }

    pub fn as_number(self) -> u16 {
        self as u16
    }

    /// Every version this build knows how to name.
    pub fn all() -> &'static [ReportVersion] {
        &Self::ALL
    }
}

impl fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_number())
    }
}

/// Bytes written to one stream and the amount captured for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamUsage {
    pub id: String,
    pub capture: i128,
    pub bytes: u64,
}

/// Bytes queried by one consumer and the amount captured from its stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumerUsage {
    pub id: Address,
    pub capture: i128,
    pub bytes: u64,
}

/// One query served during the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEvent {
    pub id: String,
    pub consumer: Address,
    pub size: u64,
}

/// One storage write observed during the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub id: String,
    pub stream: String,
    pub size: u64,
}

/// Diagnostic metadata. Never hashed or signed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEvents {
    #[serde(default)]
    pub queries: Vec<QueryEvent>,
    #[serde(default)]
    pub storage: Vec<StorageEvent>,
}

/// Economic summary of one bundle.
///
/// `nodes` and `delegates` are keyed by address so iteration order, and with
/// it the canonical contract tuple, is identical on every node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub version: ReportVersion,
    pub id: BundleId,
    pub height: BlockHeight,
    pub treasury: i128,
    pub streams: Vec<StreamUsage>,
    pub consumers: Vec<ConsumerUsage>,
    pub nodes: BTreeMap<Address, i128>,
    pub delegates: BTreeMap<Address, BTreeMap<Address, i128>>,
    pub events: Option<ReportEvents>,
}

impl Report {
    /// Empty report at the latest version.
    pub fn new(id: BundleId, height: BlockHeight) -> Self {
        Self {
            version: ReportVersion::LATEST,
            id,
            height,
            treasury: 0,
            streams: Vec::new(),
            consumers: Vec::new(),
            nodes: BTreeMap::new(),
            delegates: BTreeMap::new(),
            events: None,
        }
    }

    /// Sum of stream and consumer captures.
    pub fn total_capture(&self) -> i128 {
        self.streams.iter().map(|s| s.capture).sum::<i128>()
            + self.consumers.iter().map(|c| c.capture).sum::<i128>()
    }

    /// Reject reports the ledger could never accept.
    pub fn validate(&self) -> CodecResult<()> {
        if self.id.as_str().is_empty() {
            return Err(CodecError::invalid_payload("empty report id"));
        }
        if let Some(stream) = self.streams.iter().find(|s| s.id.is_empty()) {
            return Err(CodecError::invalid_payload(format!(
                "stream with empty id (capture {})",
                stream.capture
            )));
        }
        if let Some(stream) = self.streams.iter().find(|s| s.capture < 0) {
            return Err(CodecError::invalid_payload(format!(
                "negative capture for stream {}",
                stream.id
            )));
        }
        if let Some(consumer) = self.consumers.iter().find(|c| c.capture < 0) {
            return Err(CodecError::invalid_payload(format!(
                "negative capture for consumer {}",
                consumer.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_numbers() {
        assert_eq!(ReportVersion::from_number(1), Some(ReportVersion::V1));
        assert_eq!(ReportVersion::from_number(0), None);
        assert_eq!(ReportVersion::from_number(2), None);
        assert_eq!(ReportVersion::LATEST.as_number(), 1);
        assert_eq!(ReportVersion::V1.to_string(), "v1");
    }

    #[test]
    fn test_empty_id_is_invalid() {
        let report = Report::new(BundleId::new(""), 10);
        assert!(matches!(
            report.validate(),
            Err(CodecError::InvalidReportPayload { .. })
        ));
    }

    #[test]
    fn test_negative_capture_is_invalid() {
        let mut report = Report::new(BundleId::new("75"), 10);
        report.consumers.push(ConsumerUsage {
            id: Address([1; 20]),
            capture: -5,
            bytes: 10,
        });
        let err = report.validate().unwrap_err();
        assert!(err.to_string().contains("negative capture for consumer"));
    }

    #[test]
    fn test_negative_node_change_is_allowed() {
        let mut report = Report::new(BundleId::new("75"), 10);
        report.nodes.insert(Address([2; 20]), -100);
        report.treasury = -3;
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_total_capture() {
        let mut report = Report::new(BundleId::new("75"), 10);
        report.streams.push(StreamUsage {
            id: "s".into(),
            capture: 30,
            bytes: 3,
        });
        report.consumers.push(ConsumerUsage {
            id: Address([1; 20]),
            capture: 12,
            bytes: 6,
        });
        assert_eq!(report.total_capture(), 42);
    }
}
