//! Result of running one bundle.

use crate::ports::outbound::LedgerReceipt;
use shared_types::{Address, BundleId, Hash};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The local node submitted the report.
    Submitted {
        bundle_id: BundleId,
        hash: Hash,
        signers: Vec<Address>,
        receipt: LedgerReceipt,
    },
    /// A peer submitted an identical report first.
    Abstained {
        bundle_id: BundleId,
        hash: Hash,
        reporter: Address,
    },
}

impl Outcome {
    pub fn bundle_id(&self) -> &BundleId {
        match self {
            Self::Submitted { bundle_id, .. } | Self::Abstained { bundle_id, .. } => bundle_id,
        }
    }

    pub fn hash(&self) -> &Hash {
        match self {
            Self::Submitted { hash, .. } | Self::Abstained { hash, .. } => hash,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}
