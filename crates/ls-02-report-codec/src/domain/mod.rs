//! Domain layer: report model, quantities and the canonical contract tuple.

pub mod contract;
pub mod quantity;
pub mod report;

pub use contract::{contract_hash, ContractParams, SubmissionPayload};
pub use quantity::{parse_hex_quantity, to_hex_quantity};
pub use report::{
    ConsumerUsage, QueryEvent, Report, ReportEvents, ReportVersion, StorageEvent, StreamUsage,
};
