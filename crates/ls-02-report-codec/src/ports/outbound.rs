//! # Outbound Ports (Driven Ports / SPI)
//!
//! Signing is the only capability the codec needs from the outside world.

use crate::error::CodecResult;
use async_trait::async_trait;
use shared_types::{Address, Hash, RecoverableSignature};

/// Produces the node's signature over a timestamped report hash.
///
/// Implementations sign `toth`'s raw 32 bytes with the personal-message
/// prefix applied, so the ledger can recover the address on chain.
#[async_trait]
pub trait ReportSigner: Send + Sync {
    /// Address the signatures recover to.
    fn address(&self) -> Address;

    /// Sign the raw bytes of `toth`.
    async fn sign_toth(&self, toth: &Hash) -> CodecResult<RecoverableSignature>;
}
