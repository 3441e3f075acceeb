//! Local secp256k1 key signer.

use crate::error::CodecResult;
use crate::ports::outbound::ReportSigner;
use async_trait::async_trait;
use shared_crypto::{sign_personal_message, Secp256k1KeyPair};
use shared_types::{Address, Hash, RecoverableSignature};

#[async_trait]
impl ReportSigner for Secp256k1KeyPair {
    fn address(&self) -> Address {
        Secp256k1KeyPair::address(self)
    }

    async fn sign_toth(&self, toth: &Hash) -> CodecResult<RecoverableSignature> {
        Ok(sign_personal_message(self, toth)?)
    }
}
