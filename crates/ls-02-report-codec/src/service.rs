//! Report Codec service.

use crate::domain::{contract_hash, ContractParams, Report, ReportVersion, SubmissionPayload};
use crate::error::{CodecError, CodecResult};
use crate::ports::outbound::ReportSigner;
use crate::serializer::{SerializedReport, SerializerRegistry};
use shared_crypto::recover_signer;
use shared_types::{Hash, ProofOfReport};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Milliseconds since the Unix epoch, the unit of proof timestamps.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Serializes, hashes and attests reports.
#[derive(Clone, Debug)]
pub struct ReportCodec {
    registry: Arc<SerializerRegistry>,
}

impl Default for ReportCodec {
    fn default() -> Self {
        Self::new(Arc::new(SerializerRegistry::with_defaults()))
    }
}

impl ReportCodec {
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    /// Versioned form of `report`.
    pub fn serialize(&self, report: &Report) -> CodecResult<SerializedReport> {
        report.validate()?;
        self.registry.get(report.version)?.serialize(report)
    }

    /// Report from its versioned form.
    pub fn deserialize(&self, form: &SerializedReport) -> CodecResult<Report> {
        if !form.s {
            return Err(CodecError::invalid_payload("report is not in serialized form"));
        }
        let version = ReportVersion::from_number(form.v)
            .ok_or(CodecError::InvalidVersion { version: form.v })?;

        let report = self.registry.get(version)?.deserialize(form)?;
        report.validate()?;
        Ok(report)
    }

    /// Stable bytes: serializing the same report twice yields the same bytes.
    pub fn encode(&self, report: &Report) -> CodecResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.serialize(report)?)?)
    }

    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Report> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.get("v").is_none() || value.get("s").is_none() {
            return Err(CodecError::invalid_payload("missing version or serialized tag"));
        }
        let form: SerializedReport = serde_json::from_value(value)
            .map_err(|e| CodecError::invalid_payload(e.to_string()))?;
        self.deserialize(&form)
    }

    pub fn to_contract(&self, report: &Report) -> CodecResult<ContractParams> {
        report.validate()?;
        self.registry.get(report.version)?.to_contract(report)
    }

    /// Canonical digest; with a timestamp this is the report's `toth`.
    pub fn hash(&self, report: &Report, timestamp: Option<u64>) -> CodecResult<Hash> {
        Ok(contract_hash(&self.to_contract(report)?, timestamp))
    }

    /// Attest `report` at `timestamp` (milliseconds).
    pub async fn to_proof(
        &self,
        report: &Report,
        signer: &dyn ReportSigner,
        timestamp: u64,
    ) -> CodecResult<ProofOfReport> {
        let params = self.to_contract(report)?;
        let hash = contract_hash(&params, None);
        let toth = contract_hash(&params, Some(timestamp));
        let signature = signer.sign_toth(&toth).await?;

        debug!(
            bundle_id = %report.id,
            height = report.height,
            timestamp,
            signer = %signer.address(),
            "Report attested"
        );

        Ok(ProofOfReport {
            hash,
            toth,
            address: signer.address(),
            signature,
            timestamp,
        })
    }

    /// Check that `proof` attests exactly this report and was signed by its
    /// claimed address.
    pub fn verify_proof(&self, report: &Report, proof: &ProofOfReport) -> CodecResult<()> {
        let mismatch = |reason: String| CodecError::ProofMismatch {
            address: proof.address.to_hex(),
            reason,
        };

        let params = self.to_contract(report)?;
        if contract_hash(&params, None) != proof.hash {
            return Err(mismatch("report hash differs".into()));
        }
        if contract_hash(&params, Some(proof.timestamp)) != proof.toth {
            return Err(mismatch(format!(
                "toth does not match timestamp {}",
                proof.timestamp
            )));
        }

        let recovered = recover_signer(&proof.toth, &proof.signature)?;
        if recovered != proof.address {
            warn!(
                bundle_id = %report.id,
                claimed = %proof.address,
                recovered = %recovered,
                "Proof signature recovers to a different address"
            );
            return Err(mismatch(format!("signature recovers to {}", recovered)));
        }
        Ok(())
    }

    /// Ledger submission for `report` carrying one column per proof, in the
    /// order given.
    pub fn build_payload(
        &self,
        report: &Report,
        proofs: &[ProofOfReport],
    ) -> CodecResult<SubmissionPayload> {
        Ok(SubmissionPayload {
            params: self.to_contract(report)?,
            addresses: proofs.iter().map(|p| p.address).collect(),
            timestamps: proofs.iter().map(|p| p.timestamp).collect(),
            signatures: proofs.iter().map(|p| p.signature).collect(),
        })
    }
}
