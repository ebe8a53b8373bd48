//! Hashing and text encodings used across the codec.
//!
//! SHA-256 derives item ids; SHA-384 drives the deep hash. Binary fields are
//! rendered as unpadded base64url in textual contexts.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256, Sha384};
use std::fmt;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 48-byte SHA-384 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha384Hash(pub [u8; 48]);

impl Sha384Hash {
    /// Compute the SHA-384 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        Self::hash_parts(&[data])
    }

    /// Hash the concatenation of several byte slices without allocating it.
    pub fn hash_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha384::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; 48];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 48] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha384Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA384({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha384Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode bytes as unpadded base64url.
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded base64url.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}
