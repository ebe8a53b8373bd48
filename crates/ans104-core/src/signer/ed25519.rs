//! Ed25519 signer (signature type 2).

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier, VerifyingKey};
use std::fmt;

use super::{Result, Signer};
use crate::error::SignerError;
use crate::scheme::SignatureType;

/// Owner slot: the 32-byte public key.
pub const OWNER_LENGTH: usize = 32;

/// Signature slot: a 64-byte Ed25519 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// A local Ed25519 signer.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
    public_key: [u8; 32],
}

impl Ed25519Signer {
    /// Generate a new random signer.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_signing_key(SigningKey::generate(&mut rng))
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = signing_key.verifying_key().to_bytes();
        Self {
            signing_key,
            public_key,
        }
    }

    /// Sign synchronously.
    pub fn sign_bytes(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signer({}...)", &hex::encode(self.public_key)[..8])
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ed25519
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.sign_bytes(message).to_vec())
    }
}

/// Verify an Ed25519 signature. Slot lengths are checked by the registry.
pub fn verify(owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let (Ok(owner), Ok(signature)) = (
        <[u8; OWNER_LENGTH]>::try_from(owner),
        <[u8; SIGNATURE_LENGTH]>::try_from(signature),
    ) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&owner) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(&signature))
        .is_ok()
}

pub(crate) fn boxed_signer(secret: &[u8]) -> Result<Box<dyn Signer>> {
    let seed: [u8; 32] = secret.try_into().map_err(|_| {
        SignerError::InvalidSecretKey(format!("ed25519 seed must be 32 bytes, got {}", secret.len()))
    })?;
    Ok(Box::new(Ed25519Signer::from_seed(&seed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_verify() {
        let mut signer = Ed25519Signer::from_seed(&[0x42; 32]);
        let message = b"hello world";
        let signature = signer.sign(message).await.unwrap();

        assert_eq!(signature.len(), SIGNATURE_LENGTH);
        assert!(verify(signer.public_key(), message, &signature));
        assert!(!verify(signer.public_key(), b"hello worlD", &signature));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let s1 = Ed25519Signer::from_seed(&[0x42; 32]);
        let s2 = Ed25519Signer::from_seed(&[0x42; 32]);
        assert_eq!(s1.public_key(), s2.public_key());
        assert_eq!(s1.sign_bytes(b"m"), s2.sign_bytes(b"m"));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let s1 = Ed25519Signer::from_seed(&[1; 32]);
        let s2 = Ed25519Signer::from_seed(&[2; 32]);
        let sig = s1.sign_bytes(b"m");
        assert!(!verify(s2.public_key(), b"m", &sig));
    }

    #[test]
    fn test_bad_seed_length() {
        assert!(matches!(
            boxed_signer(&[0u8; 31]),
            Err(SignerError::InvalidSecretKey(_))
        ));
    }
}
