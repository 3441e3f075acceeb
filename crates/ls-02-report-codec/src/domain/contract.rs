//! Ledger parameter tuple and its canonical hash.
//!
//! The ledger recomputes the hash from the exact tuple it receives, so the
//! rendering here must match it byte for byte:
//!
//! ```text
//!  0 id                      7 read bytes
//!  1 height                  8 node addresses
//!  2 stream ids              9 node changes            (hex)
//!  3 write captures   (hex) 10 delegate node addresses
//!  4 write bytes            11 delegator addresses      (nested)
//!  5 consumer addresses     12 delegate changes         (nested, hex)
//!  6 read captures    (hex) 13 treasury change          (hex)
//! ```
//!
//! The tuple is rendered as compact JSON, lowercased, and hashed with
//! keccak256. The timestamped hash (`toth`) appends the decimal timestamp to
//! the lowercased JSON before hashing.

use super::quantity::to_hex_quantity;
use serde_json::{json, Value};
use shared_crypto::KeccakHasher;
use shared_types::{Address, BlockHeight, Hash, RecoverableSignature};

/// Report in the ledger's positional parameter order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractParams {
    pub id: String,
    pub height: BlockHeight,
    pub stream_ids: Vec<String>,
    pub write_captures: Vec<i128>,
    pub write_bytes: Vec<u64>,
    pub consumers: Vec<Address>,
    pub read_captures: Vec<i128>,
    pub read_bytes: Vec<u64>,
    pub nodes: Vec<Address>,
    pub node_changes: Vec<i128>,
    pub delegate_nodes: Vec<Address>,
    pub delegators: Vec<Vec<Address>>,
    pub delegate_changes: Vec<Vec<i128>>,
    pub treasury_change: i128,
}

fn hex_all(values: &[i128]) -> Vec<String> {
    values.iter().copied().map(to_hex_quantity).collect()
}

fn addresses(values: &[Address]) -> Vec<String> {
    values.iter().map(Address::to_hex).collect()
}

impl ContractParams {
    /// Positional JSON array with amounts as hex quantities.
    pub fn to_canonical_value(&self) -> Value {
        json!([
            self.id,
            self.height,
            self.stream_ids,
            hex_all(&self.write_captures),
            self.write_bytes,
            addresses(&self.consumers),
            hex_all(&self.read_captures),
            self.read_bytes,
            addresses(&self.nodes),
            hex_all(&self.node_changes),
            addresses(&self.delegate_nodes),
            self.delegators
                .iter()
                .map(|d| addresses(d))
                .collect::<Vec<_>>(),
            self.delegate_changes
                .iter()
                .map(|c| hex_all(c))
                .collect::<Vec<_>>(),
            to_hex_quantity(self.treasury_change),
        ])
    }

    /// Compact, lowercased JSON rendering that feeds the hash.
    pub fn canonical_json(&self) -> String {
        self.to_canonical_value().to_string().to_lowercase()
    }
}

/// Canonical digest of `params`, optionally bound to a timestamp.
///
/// A zero timestamp is treated as absent.
pub fn contract_hash(params: &ContractParams, timestamp: Option<u64>) -> Hash {
    let mut hasher = KeccakHasher::new();
    hasher.update(params.canonical_json().as_bytes());
    if let Some(ts) = timestamp.filter(|ts| *ts != 0) {
        hasher.update(ts.to_string().as_bytes());
    }
    hasher.finalize()
}

/// Everything the ledger needs to accept a report: the tuple plus one
/// `(address, timestamp, signature)` column per attesting reporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub params: ContractParams,
    pub addresses: Vec<Address>,
    pub timestamps: Vec<u64>,
    pub signatures: Vec<RecoverableSignature>,
}

impl SubmissionPayload {
    pub fn signer_count(&self) -> usize {
        self.addresses.len()
    }
}
