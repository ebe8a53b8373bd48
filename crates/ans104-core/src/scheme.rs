//! Signature-scheme registry.
//!
//! Maps the 2-byte signature type tag at the head of every data item to the
//! scheme that fixes its owner/signature slot widths and verifies it. The
//! table is static and read-only.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CodecError, Result, SignerError};
use crate::signer::{arweave, ed25519, ethereum, Signer};

/// Signature type tag carried in the first two bytes of a data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum SignatureType {
    /// RSA-PSS (SHA-256) with a 4096-bit Arweave wallet key.
    Arweave = 1,
    /// Ed25519.
    Ed25519 = 2,
    /// secp256k1 ECDSA over an EIP-191 personal message.
    Ethereum = 3,
}

impl SignatureType {
    /// Convert to u16 for serialization.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Try to parse from u16.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Arweave),
            2 => Some(Self::Ed25519),
            3 => Some(Self::Ethereum),
            _ => None,
        }
    }

    /// The registry entry for this type.
    pub fn scheme(self) -> &'static SignatureScheme {
        &SCHEMES[self as usize - 1]
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme().name)
    }
}

impl TryFrom<u16> for SignatureType {
    type Error = CodecError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_u16(value).ok_or(CodecError::UnsupportedSignatureType(value))
    }
}

type VerifyFn = fn(&[u8], &[u8], &[u8]) -> bool;
type SignerFn = fn(&[u8]) -> std::result::Result<Box<dyn Signer>, SignerError>;

/// Immutable descriptor of a signature scheme.
pub struct SignatureScheme {
    pub signature_type: SignatureType,
    pub name: &'static str,
    pub owner_length: usize,
    pub signature_length: usize,
    verify_fn: VerifyFn,
    signer_fn: SignerFn,
}

impl SignatureScheme {
    /// Verify `signature` over `message` for the given owner (public key).
    ///
    /// Never fails: slot-length mismatches count as a verification failure.
    pub fn verify(&self, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
        if owner.len() != self.owner_length || signature.len() != self.signature_length {
            tracing::debug!(
                scheme = self.name,
                owner_len = owner.len(),
                signature_len = signature.len(),
                "malformed signature: slot lengths do not match scheme"
            );
            return false;
        }
        (self.verify_fn)(owner, message, signature)
    }

    /// Build a local signer from secret key material.
    ///
    /// - Arweave: PKCS#8 DER encoded RSA private key
    /// - ED25519: 32-byte seed
    /// - Ethereum: 32-byte secp256k1 secret scalar
    pub fn signer_from_secret(
        &self,
        secret: &[u8],
    ) -> std::result::Result<Box<dyn Signer>, SignerError> {
        (self.signer_fn)(secret)
    }
}

impl fmt::Debug for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureScheme")
            .field("signature_type", &self.signature_type)
            .field("owner_length", &self.owner_length)
            .field("signature_length", &self.signature_length)
            .finish()
    }
}

/// Registered schemes, indexed by `tag - 1`.
static SCHEMES: [SignatureScheme; 3] = [
    SignatureScheme {
        signature_type: SignatureType::Arweave,
        name: "arweave",
        owner_length: arweave::OWNER_LENGTH,
        signature_length: arweave::SIGNATURE_LENGTH,
        verify_fn: arweave::verify,
        signer_fn: arweave::boxed_signer,
    },
    SignatureScheme {
        signature_type: SignatureType::Ed25519,
        name: "ed25519",
        owner_length: ed25519::OWNER_LENGTH,
        signature_length: ed25519::SIGNATURE_LENGTH,
        verify_fn: ed25519::verify,
        signer_fn: ed25519::boxed_signer,
    },
    SignatureScheme {
        signature_type: SignatureType::Ethereum,
        name: "ethereum",
        owner_length: ethereum::OWNER_LENGTH,
        signature_length: ethereum::SIGNATURE_LENGTH,
        verify_fn: ethereum::verify,
        signer_fn: ethereum::boxed_signer,
    },
];

/// Look up a scheme by its numeric tag.
pub fn scheme(tag: u16) -> Result<&'static SignatureScheme> {
    SignatureType::try_from(tag).map(SignatureType::scheme)
}

/// All registered schemes.
pub fn schemes() -> &'static [SignatureScheme] {
    &SCHEMES
}

/// Verify a signature with the scheme registered under `tag`.
///
/// Unknown tags verify as `false`.
pub fn verify(tag: u16, owner: &[u8], message: &[u8], signature: &[u8]) -> bool {
    match scheme(tag) {
        Ok(s) => s.verify(owner, message, signature),
        Err(_) => false,
    }
}

/// Build a local signer for the scheme registered under `tag`.
pub fn signer_from_secret(
    tag: u16,
    secret: &[u8],
) -> std::result::Result<Box<dyn Signer>, SignerError> {
    scheme(tag)?.signer_from_secret(secret)
}
