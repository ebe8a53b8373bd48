//! Arweave signer (signature type 1): RSA-PSS with SHA-256 over 4096-bit keys.
//!
//! The owner is the 512-byte big-endian modulus; the public exponent is always
//! 65537.

use async_trait::async_trait;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::pss::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fmt;

use super::{Result, Signer};
use crate::error::SignerError;
use crate::scheme::SignatureType;

/// Owner slot: the 4096-bit modulus.
pub const OWNER_LENGTH: usize = 512;

/// Signature slot: one modulus-sized block.
pub const SIGNATURE_LENGTH: usize = 512;

/// Arweave wallet keys are 4096-bit.
pub const KEY_BITS: usize = 4096;

const PUBLIC_EXPONENT: u32 = 65537;

/// Largest PSS salt for a 4096-bit key and SHA-256: `em_len - h_len - 2`.
pub const MAX_SALT_LENGTH: usize = OWNER_LENGTH - 32 - 2;

/// Salt lengths accepted on verify, most common first: 32 (browser wallets),
/// the maximum (Node signers), and 0 (deterministic PSS).
const ACCEPTED_SALT_LENGTHS: [usize; 3] = [32, MAX_SALT_LENGTH, 0];

/// A local Arweave (RSA) signer.
#[derive(Clone)]
pub struct ArweaveSigner {
    key: RsaPrivateKey,
    owner: Vec<u8>,
}

impl ArweaveSigner {
    /// Generate a fresh 4096-bit key. Slow: intended for tests and tooling.
    pub fn generate() -> Result<Self> {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| SignerError::InvalidSecretKey(e.to_string()))?;
        Self::from_private_key(key)
    }

    /// Load from a PKCS#8 DER encoded private key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| SignerError::InvalidSecretKey(e.to_string()))?;
        Self::from_private_key(key)
    }

    /// Wrap an RSA private key. The modulus must be exactly 4096 bits wide.
    pub fn from_private_key(key: RsaPrivateKey) -> Result<Self> {
        if key.size() != OWNER_LENGTH {
            return Err(SignerError::InvalidSecretKey(format!(
                "arweave keys must have a {}-byte modulus, got {}",
                OWNER_LENGTH,
                key.size()
            )));
        }
        if key.e() != &BigUint::from(PUBLIC_EXPONENT) {
            return Err(SignerError::InvalidSecretKey(
                "arweave keys must use public exponent 65537".into(),
            ));
        }

        let owner = left_pad(&key.n().to_bytes_be(), OWNER_LENGTH);
        Ok(Self { key, owner })
    }

    /// Export the private key as PKCS#8 DER, the form
    /// [`signer_from_secret`](crate::scheme::signer_from_secret) accepts.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let der = self
            .key
            .to_pkcs8_der()
            .map_err(|e| SignerError::InvalidSecretKey(e.to_string()))?;
        Ok(der.as_bytes().to_vec())
    }

    /// Sign synchronously with a 32-byte salt.
    pub fn sign_bytes(&self, message: &[u8]) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        SigningKey::<Sha256>::new(self.key.clone())
            .sign_with_rng(&mut rng, message)
            .to_vec()
    }
}

impl fmt::Debug for ArweaveSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArweaveSigner({}...)", &hex::encode(&self.owner[..8]))
    }
}

#[async_trait]
impl Signer for ArweaveSigner {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Arweave
    }

    fn public_key(&self) -> &[u8] {
        &self.owner
    }

    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_bytes(message))
    }
}

/// Verify an RSA-PSS signature against an owner modulus.
///
/// Arweave signers disagree on the PSS salt length, so every length in
/// `ACCEPTED_SALT_LENGTHS` is tried.
pub fn verify(owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(public_key) = RsaPublicKey::new(
        BigUint::from_bytes_be(owner),
        BigUint::from(PUBLIC_EXPONENT),
    ) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };
    ACCEPTED_SALT_LENGTHS.iter().any(|salt_len| {
        VerifyingKey::<Sha256>::new_with_salt_len(public_key.clone(), *salt_len)
            .verify(message, &signature)
            .is_ok()
    })
}

pub(crate) fn boxed_signer(secret: &[u8]) -> Result<Box<dyn Signer>> {
    Ok(Box::new(ArweaveSigner::from_pkcs8_der(secret)?))
}

fn left_pad(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = vec![0u8; width.saturating_sub(bytes.len())];
    out.extend_from_slice(bytes);
    out
}
