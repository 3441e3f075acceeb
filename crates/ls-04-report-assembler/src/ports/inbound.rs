//! Driving Ports (API - Inbound)

use crate::domain::{Bundle, Outcome};
use crate::error::AssemblerResult;
use async_trait::async_trait;
use shared_bus::Shutdown;
use shared_types::{Address, BundleId, Hash, ProofOfReport};

/// Primary Report Assembler API
#[async_trait]
pub trait ReportAssemblerApi: Send + Sync {
    /// Build, attest and (when this node's slot comes) submit the report for
    /// `bundle`.
    async fn run_bundle(&self, bundle: &Bundle, shutdown: &Shutdown) -> AssemblerResult<Outcome>;

    /// Add a gossiped proof. Returns `false` if it was forged or the signer
    /// already has a proof for this bundle.
    fn receive_proof(&self, bundle_id: &BundleId, proof: ProofOfReport) -> bool;

    /// Record a submission observed on the ledger.
    fn receive_peer_submission(&self, bundle_id: &BundleId, reporter: Address, hash: Hash);

    fn is_submitted(&self, bundle_id: &BundleId) -> bool;
}
