//! # ECDSA Signatures (secp256k1)
//!
//! Recoverable secp256k1 signatures in the ledger's `r || s || v` layout.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//! - Signer identity is always recovered, never taken from the message
//!
//! ## Use Cases
//!
//! - Signing `ProofOfReport` digests
//! - Recovering report signers during quorum tallies

use crate::hashing::{keccak256, personal_message_hash};
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use shared_types::{Address, RecoverableSignature};
use zeroize::Zeroize;

/// secp256k1 ECDSA keypair identifying one reporter.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Ledger address of this key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest directly (no message prefix).
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        // Flip parity if normalization inverted s
        let (sig, recid) = match sig.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced()),
            ),
            None => (sig, recid),
        };

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&sig.to_bytes());
        bytes[64] = recid.to_byte() + 27;
        Ok(RecoverableSignature(bytes))
    }

    /// Personal-message signature over `message`.
    pub fn sign_message(&self, message: &[u8]) -> Result<RecoverableSignature, CryptoError> {
        sign_personal_message(self, message)
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        // Zeroize secret key material
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}

/// Sign `message` with the personal-message prefix applied.
pub fn sign_personal_message(
    keypair: &Secp256k1KeyPair,
    message: &[u8],
) -> Result<RecoverableSignature, CryptoError> {
    keypair.sign_prehash(&personal_message_hash(message))
}

/// Recover the address that produced a personal-message `signature` over `message`.
pub fn recover_signer(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    recover_prehash(&personal_message_hash(message), signature)
}

/// Recover the address that signed a raw 32-byte digest.
pub fn recover_prehash(
    digest: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let recovery_id = parse_recovery_id(signature.v())?;
    let sig = Signature::from_slice(&signature.as_bytes()[..64])
        .map_err(|_| CryptoError::InvalidSignature)?;

    let recovered = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&recovered))
}

/// Derive the ledger address from a public key.
///
/// Last 20 bytes of `keccak256(x || y)` of the uncompressed point.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };

    RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(v))
}
