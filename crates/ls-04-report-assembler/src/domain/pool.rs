//! Append-only proof pool.

use shared_types::{Address, BundleId, ProofOfReport};
use std::collections::{btree_map::Entry, BTreeMap, HashMap};

/// Proofs received per bundle, keyed by signer.
///
/// The first proof from a signer wins; later ones are ignored.
#[derive(Debug, Default)]
pub struct ProofPool {
    bundles: HashMap<BundleId, BTreeMap<Address, ProofOfReport>>,
}

impl ProofPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the signer already has a proof for this bundle.
    pub fn insert(&mut self, bundle_id: &BundleId, proof: ProofOfReport) -> bool {
        match self
            .bundles
            .entry(bundle_id.clone())
            .or_default()
            .entry(proof.address)
        {
            Entry::Vacant(slot) => {
                slot.insert(proof);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Proofs for `bundle_id`, ordered by signer.
    pub fn proofs(&self, bundle_id: &BundleId) -> Vec<ProofOfReport> {
        self.bundles
            .get(bundle_id)
            .map(|proofs| proofs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, bundle_id: &BundleId) -> usize {
        self.bundles.get(bundle_id).map_or(0, BTreeMap::len)
    }

    /// Drop everything held for a settled bundle.
    pub fn remove(&mut self, bundle_id: &BundleId) -> usize {
        self.bundles.remove(bundle_id).map_or(0, |p| p.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::RecoverableSignature;

    fn proof(signer: u8, timestamp: u64) -> ProofOfReport {
        ProofOfReport {
            hash: [1; 32],
            toth: [2; 32],
            address: Address([signer; 20]),
            signature: RecoverableSignature([0; 65]),
            timestamp,
        }
    }

    #[test]
    fn test_first_proof_per_signer_wins() {
        let mut pool = ProofPool::new();
        let bundle = BundleId::new("75");

        assert!(pool.insert(&bundle, proof(1, 10)));
        assert!(!pool.insert(&bundle, proof(1, 99)));
        assert!(pool.insert(&bundle, proof(2, 11)));

        let proofs = pool.proofs(&bundle);
        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[0].timestamp, 10);
    }

    #[test]
    fn test_bundles_are_isolated() {
        let mut pool = ProofPool::new();
        pool.insert(&BundleId::new("75"), proof(1, 10));
        assert_eq!(pool.len(&BundleId::new("76")), 0);
        assert_eq!(pool.remove(&BundleId::new("75")), 1);
        assert!(pool.proofs(&BundleId::new("75")).is_empty());
    }
}
