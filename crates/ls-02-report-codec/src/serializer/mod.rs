//! Versioned report serializers.
//!
//! The versioned form is a flat JSON object: `{ "v": <version>, "s": true,
//! ...body }`. Each version owns its body layout and its mapping onto the
//! ledger tuple.

pub mod registry;
pub mod v1;

pub use registry::SerializerRegistry;
pub use v1::ReportSerializerV1;

use crate::domain::{ContractParams, Report, ReportVersion};
use crate::error::CodecResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// JSON-safe, versioned rendering of a report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedReport {
    /// Version tag.
    pub v: u16,
    /// Always `true` for the serialized form.
    pub s: bool,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// One report format version.
pub trait ReportSerializer: Send + Sync + Debug {
    fn version(&self) -> ReportVersion;

    fn serialize(&self, report: &Report) -> CodecResult<SerializedReport>;

    fn deserialize(&self, form: &SerializedReport) -> CodecResult<Report>;

    /// Map the report onto the ledger's positional parameters.
    fn to_contract(&self, report: &Report) -> CodecResult<ContractParams>;
}
