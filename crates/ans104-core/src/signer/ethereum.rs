//! Ethereum signer (signature type 3): secp256k1 over EIP-191 personal messages.
//!
//! The owner is the 65-byte uncompressed SEC1 public key. The signature is
//! `r || s || v` with `v` in `{27, 28}` (raw `{0, 1}` is also accepted).
//! Verification recovers the signing key from the signature and compares the
//! derived addresses, the same check a wallet's `verifyMessage` performs.

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use std::fmt;

use super::injected::MessageSigner;
use super::{Result, Signer};
use crate::error::SignerError;
use crate::scheme::SignatureType;

/// Owner slot: uncompressed SEC1 public key (`0x04 || x || y`).
pub const OWNER_LENGTH: usize = 65;

/// Signature slot: `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// A 20-byte Ethereum address.
pub type Address = [u8; 20];

/// Hash a message the way `personal_sign` does:
/// `keccak256("\x19Ethereum Signed Message:\n" || len || message)`.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Derive the address of a public key given in any SEC1 encoding.
pub fn address_from_public_key(public_key: &[u8]) -> Option<Address> {
    VerifyingKey::from_sec1_bytes(public_key)
        .ok()
        .map(|key| address_of(&key))
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}

/// Uncompressed SEC1 encoding of a verifying key.
pub fn uncompressed_public_key(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes().to_vec()
}

/// Recover the signing key from a 65-byte signature over a 32-byte prehash.
pub fn recover_public_key(prehash: &[u8; 32], signature: &[u8]) -> Result<VerifyingKey> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignerError::InvalidSignatureEncoding(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let mut sig = Signature::from_slice(&signature[..64])
        .map_err(|e| SignerError::InvalidSignatureEncoding(e.to_string()))?;

    let v = signature[64];
    let v = if v >= 27 { v - 27 } else { v };
    let mut recovery_id = RecoveryId::from_byte(v).ok_or_else(|| {
        SignerError::InvalidSignatureEncoding(format!("invalid recovery byte {}", signature[64]))
    })?;

    // High-s signatures are valid on Ethereum; flip to the low-s twin.
    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|e| SignerError::KeyRecovery(e.to_string()))
}

/// Verify an Ethereum personal-message signature against an owner key.
pub fn verify(owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Some(expected) = address_from_public_key(owner) else {
        return false;
    };
    match recover_public_key(&hash_message(message), signature) {
        Ok(recovered) => address_of(&recovered) == expected,
        Err(e) => {
            tracing::debug!(error = %e, "ethereum signature recovery failed");
            false
        }
    }
}

/// A local secp256k1 signer.
///
/// Also usable as a [`MessageSigner`], in which case it behaves like a
/// wallet answering `personal_sign` requests.
#[derive(Clone)]
pub struct EthereumSigner {
    signing_key: SigningKey,
    public_key: Vec<u8>,
}

impl EthereumSigner {
    /// Generate a new random signer.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_signing_key(SigningKey::random(&mut rng))
    }

    /// Create from a 32-byte secret scalar.
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|e| SignerError::InvalidSecretKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = uncompressed_public_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// The signer's address.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// The signer's address as `0x`-prefixed lowercase hex.
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address()))
    }

    /// Produce an EIP-191 personal-message signature.
    pub fn sign_personal(&self, message: &[u8]) -> Result<[u8; 65]> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash_message(message))
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for EthereumSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthereumSigner({})", self.address_hex())
    }
}

#[async_trait]
impl Signer for EthereumSigner {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ethereum
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_personal(message)?.to_vec())
    }
}

#[async_trait]
impl MessageSigner for EthereumSigner {
    async fn sign_message(&self, message: &[u8]) -> Result<String> {
        Ok(format!("0x{}", hex::encode(self.sign_personal(message)?)))
    }
}

pub(crate) fn boxed_signer(secret: &[u8]) -> Result<Box<dyn Signer>> {
    Ok(Box::new(EthereumSigner::from_secret(secret)?))
}
