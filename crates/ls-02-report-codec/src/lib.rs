//! # ls-02-report-codec
//!
//! Deterministic report encoding so independently running nodes produce
//! byte-identical digests.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Versioned form**: `{ "v": 1, "s": true, ...body }` with hex amounts
//! - **Serializer registry**: one serializer per version, explicit and injectable
//! - **Canonical hash**: keccak256 over the lowercased positional ledger tuple
//! - **Proof of report**: timestamped hash (`toth`) signed as a personal message
//!
//! ## Hashing
//!
//! ```text
//! Report ──to_contract──→ ContractParams ──hex amounts, JSON, lowercase──→ bytes
//!                                                                           │
//!                                    keccak256(bytes)              = hash   │
//!                                    keccak256(bytes ‖ "<millis>") = toth ──┴──→ sign
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ls_02_report_codec::{now_millis, ReportCodec};
//!
//! let codec = ReportCodec::default();
//! let hash = codec.hash(&report, None)?;
//! let proof = codec.to_proof(&report, &keypair, now_millis()).await?;
//! codec.verify_proof(&report, &proof)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod serializer;
pub mod service;

pub use domain::{
    contract_hash, parse_hex_quantity, to_hex_quantity, ConsumerUsage, ContractParams,
    QueryEvent, Report, ReportEvents, ReportVersion, StorageEvent, StreamUsage,
    SubmissionPayload,
};
pub use error::{CodecError, CodecResult};
pub use ports::outbound::ReportSigner;
pub use serializer::{ReportSerializer, ReportSerializerV1, SerializedReport, SerializerRegistry};
pub use service::{now_millis, ReportCodec};
