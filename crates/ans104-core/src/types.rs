//! Strong type definitions shared by data items and bundles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::{base64url_decode, base64url_encode, Sha256Hash};
use crate::error::CodecError;

/// A 32-byte data item identifier, computed as SHA-256(signature).
///
/// Rendered as unpadded base64url (43 characters) in textual contexts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub [u8; 32]);

impl ItemId {
    /// Create a new ItemId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the id of an item from its raw signature bytes.
    pub fn from_signature(signature: &[u8]) -> Self {
        Self(Sha256Hash::hash(signature).0)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to base64url string.
    pub fn to_base64url(&self) -> String {
        base64url_encode(&self.0)
    }

    /// Parse from base64url string.
    pub fn from_base64url(s: &str) -> Result<Self, CodecError> {
        let bytes = base64url_decode(s)
            .map_err(|e| CodecError::InvalidDataItemFormat(format!("invalid id encoding: {}", e)))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CodecError::InvalidDataItemFormat(format!("id must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.to_base64url())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

impl FromStr for ItemId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64url(s)
    }
}

impl AsRef<[u8]> for ItemId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ItemId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ItemId {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

impl Serialize for ItemId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

/// A name/value pair attached to a data item.
///
/// Order and duplicates are significant: both feed the signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    /// Create a new tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_base64url_roundtrip() {
        let id = ItemId::from_bytes([0x42; 32]);
        let text = id.to_base64url();
        assert_eq!(text.len(), 43);
        let recovered: ItemId = text.parse().unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_item_id_rejects_wrong_length() {
        let short = base64url_encode(&[1u8; 31]);
        assert!(matches!(
            ItemId::from_base64url(&short),
            Err(CodecError::InvalidDataItemFormat(_))
        ));
        assert!(ItemId::from_base64url("not base64!").is_err());
    }

    #[test]
    fn test_item_id_from_signature() {
        let id = ItemId::from_signature(b"abc");
        assert_eq!(id.0, Sha256Hash::hash(b"abc").0);
    }

    #[test]
    fn test_item_id_serde_as_string() {
        let id = ItemId::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
