//! Data item: one signed, tagged, content-addressed payload.
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! signature type     2 bytes
//! signature          scheme signature_length
//! owner              scheme owner_length
//! target flag        1 byte (0 or 1), then 32 bytes if 1
//! anchor flag        1 byte (0 or 1), then 32 bytes if 1
//! tag count          8 bytes
//! tag bytes length   8 bytes
//! tags               tag bytes length (see `tags`)
//! data               remainder
//! ```
//!
//! The signature covers the deep hash of
//! `["dataitem", "1", type, owner, target, anchor, tags, data]`, where absent
//! target/anchor contribute empty blobs and `tags` is the encoded tag bytes.
//! The item id is SHA-256 of the signature.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::byte_array::{fixed_bytes_to_u64, long_to_8_bytes, short_to_2_bytes};
use crate::crypto::{base64url_encode, Sha384Hash};
use crate::deep_hash::{deep_hash, DeepHashChunk};
use crate::error::{CodecError, Result, SignerError};
use crate::scheme::SignatureType;
use crate::signer::Signer;
use crate::tags::{deserialize_tags, serialize_tags, verify_tags};
use crate::types::{ItemId, Tag};

/// Width of the target and anchor fields when present.
pub const TARGET_LENGTH: usize = 32;
pub const ANCHOR_LENGTH: usize = 32;

/// Optional fields for [`create_data`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataItemOptions {
    pub tags: Vec<Tag>,
    pub target: Option<Vec<u8>>,
    pub anchor: Option<Vec<u8>>,
}

impl DataItemOptions {
    /// Append a tag.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    /// Set all tags, replacing any added so far.
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the target address.
    pub fn target(mut self, target: impl Into<Vec<u8>>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the anchor.
    pub fn anchor(mut self, anchor: impl Into<Vec<u8>>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// A data item: header fields, tags, payload and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    /// Scheme of `signature` and `owner`.
    pub signature_type: SignatureType,

    /// Raw signature. All zeroes until signed.
    pub signature: Bytes,

    /// Signer public key.
    pub owner: Bytes,

    /// Optional 32-byte target address.
    pub target: Option<[u8; 32]>,

    /// Optional 32-byte anchor.
    pub anchor: Option<[u8; 32]>,

    /// Ordered tags.
    pub tags: Vec<Tag>,

    /// Opaque payload.
    pub data: Bytes,
}

/// Build an unsigned data item for `signer`.
///
/// The owner is taken from the signer's current public key, which may still be
/// empty for a keyless signer; [`DataItem::sign`] fills it in.
pub fn create_data(
    data: impl Into<Bytes>,
    signer: &dyn Signer,
    options: DataItemOptions,
) -> Result<DataItem> {
    verify_tags(&options.tags)?;

    let target = fixed_field(options.target, CodecError::InvalidTarget)?;
    let anchor = fixed_field(options.anchor, CodecError::InvalidAnchor)?;

    let scheme = signer.signature_type().scheme();
    let owner = signer.public_key();
    if !owner.is_empty() && owner.len() != scheme.owner_length {
        return Err(CodecError::InvalidDataItemFormat(format!(
            "signer public key is {} bytes, {} expects {}",
            owner.len(),
            scheme.name,
            scheme.owner_length
        )));
    }

    Ok(DataItem {
        signature_type: scheme.signature_type,
        signature: Bytes::from(vec![0u8; scheme.signature_length]),
        owner: Bytes::copy_from_slice(owner),
        target,
        anchor,
        tags: options.tags,
        data: data.into(),
    })
}

fn fixed_field(
    value: Option<Vec<u8>>,
    error: fn(usize) -> CodecError,
) -> Result<Option<[u8; 32]>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => {
            let arr: [u8; 32] = v.as_slice().try_into().map_err(|_| error(v.len()))?;
            Ok(Some(arr))
        }
    }
}

impl DataItem {
    /// The content-addressed id: SHA-256 of the signature.
    pub fn id(&self) -> ItemId {
        ItemId::from_signature(&self.signature)
    }

    /// The id, or [`CodecError::MissingDataItemId`] if the item is unsigned.
    pub fn signed_id(&self) -> Result<ItemId> {
        if self.is_signed() {
            Ok(self.id())
        } else {
            Err(CodecError::MissingDataItemId)
        }
    }

    /// Whether a signature has been attached.
    pub fn is_signed(&self) -> bool {
        self.signature.len() == self.signature_type.scheme().signature_length
            && self.signature.iter().any(|b| *b != 0)
    }

    /// The encoded tag bytes, as carried on the wire and in the signed payload.
    pub fn raw_tags(&self) -> Vec<u8> {
        serialize_tags(&self.tags)
    }

    /// The deep hash the signature is computed over.
    pub fn signature_data(&self) -> Sha384Hash {
        let type_tag = self.signature_type.to_u16().to_string();
        let raw_tags = self.raw_tags();
        let target: &[u8] = match &self.target {
            Some(target) => target,
            None => &[],
        };
        let anchor: &[u8] = match &self.anchor {
            Some(anchor) => anchor,
            None => &[],
        };

        deep_hash(&DeepHashChunk::List(vec![
            DeepHashChunk::Blob(b"dataitem"),
            DeepHashChunk::Blob(b"1"),
            DeepHashChunk::Blob(type_tag.as_bytes()),
            DeepHashChunk::Blob(&self.owner),
            DeepHashChunk::Blob(target),
            DeepHashChunk::Blob(anchor),
            DeepHashChunk::Blob(&raw_tags),
            DeepHashChunk::Blob(&self.data),
        ]))
    }

    /// Sign the item in place and return its id.
    ///
    /// Keys the signer first if needed, then takes the signature type and
    /// owner from it so the signed payload always matches the signer.
    pub async fn sign(
        &mut self,
        signer: &mut dyn Signer,
    ) -> std::result::Result<ItemId, SignerError> {
        signer.set_public_key().await?;

        let scheme = signer.signature_type().scheme();
        let owner = signer.public_key();
        if owner.len() != scheme.owner_length {
            return Err(SignerError::KeyRecovery(format!(
                "signer public key is {} bytes, {} expects {}",
                owner.len(),
                scheme.name,
                scheme.owner_length
            )));
        }
        self.signature_type = scheme.signature_type;
        self.owner = Bytes::copy_from_slice(owner);

        let message = self.signature_data();
        let signature = signer.sign(message.as_bytes()).await?;
        if signature.len() != scheme.signature_length {
            return Err(SignerError::InvalidSignatureEncoding(format!(
                "signature is {} bytes, {} expects {}",
                signature.len(),
                scheme.name,
                scheme.signature_length
            )));
        }
        self.signature = Bytes::from(signature);
        Ok(self.id())
    }

    /// Check tags, slot widths and the signature.
    pub fn is_valid(&self) -> bool {
        if let Err(e) = verify_tags(&self.tags) {
            tracing::debug!(id = %self.id(), error = %e, "data item has invalid tags");
            return false;
        }
        let valid = self.signature_type.scheme().verify(
            &self.owner,
            self.signature_data().as_bytes(),
            &self.signature,
        );
        if !valid {
            tracing::debug!(id = %self.id(), "data item signature does not verify");
        }
        valid
    }

    /// Decode and validate a raw item.
    pub fn verify_bytes(raw: &[u8]) -> bool {
        match Self::from_bytes(Bytes::copy_from_slice(raw)) {
            Ok(item) => item.is_valid(),
            Err(e) => {
                tracing::debug!(error = %e, "raw data item does not decode");
                false
            }
        }
    }

    /// Size of the wire encoding.
    pub fn encoded_len(&self) -> usize {
        let scheme = self.signature_type.scheme();
        2 + scheme.signature_length
            + scheme.owner_length
            + 1
            + self.target.map_or(0, |_| TARGET_LENGTH)
            + 1
            + self.anchor.map_or(0, |_| ANCHOR_LENGTH)
            + 16
            + self.raw_tags().len()
            + self.data.len()
    }

    /// Encode to the wire format.
    ///
    /// Fails if the signature or owner do not fill their scheme slots, which
    /// is the case for an item created by a keyless signer and never signed.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let scheme = self.signature_type.scheme();
        if self.signature.len() != scheme.signature_length {
            return Err(CodecError::InvalidDataItemFormat(format!(
                "signature is {} bytes, {} expects {}",
                self.signature.len(),
                scheme.name,
                scheme.signature_length
            )));
        }
        if self.owner.len() != scheme.owner_length {
            return Err(CodecError::InvalidDataItemFormat(format!(
                "owner is {} bytes, {} expects {}",
                self.owner.len(),
                scheme.name,
                scheme.owner_length
            )));
        }

        let raw_tags = self.raw_tags();
        let mut buf = Vec::with_capacity(self.encoded_len());

        buf.extend_from_slice(&short_to_2_bytes(self.signature_type.to_u16()));
        buf.extend_from_slice(&self.signature);
        buf.extend_from_slice(&self.owner);

        match &self.target {
            Some(target) => {
                buf.push(1);
                buf.extend_from_slice(target);
            }
            None => buf.push(0),
        }
        match &self.anchor {
            Some(anchor) => {
                buf.push(1);
                buf.extend_from_slice(anchor);
            }
            None => buf.push(0),
        }

        buf.extend_from_slice(&long_to_8_bytes(self.tags.len() as u64));
        buf.extend_from_slice(&long_to_8_bytes(raw_tags.len() as u64));
        buf.extend_from_slice(&raw_tags);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    /// Decode from the wire format.
    ///
    /// `signature`, `owner` and `data` are zero-copy slices of `raw`.
    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self> {
        let raw: Bytes = raw.into();
        let mut cursor = Cursor { raw: &raw, pos: 0 };

        let type_bytes = cursor.take(2, "signature type")?;
        let tag = u16::from_le_bytes([type_bytes[0], type_bytes[1]]);
        let signature_type = SignatureType::try_from(tag)?;
        let scheme = signature_type.scheme();

        let signature = cursor.take_bytes(scheme.signature_length, "signature")?;
        let owner = cursor.take_bytes(scheme.owner_length, "owner")?;
        let target = cursor.take_optional("target")?;
        let anchor = cursor.take_optional("anchor")?;

        let tag_count = fixed_bytes_to_u64(cursor.take(8, "tag count")?)?;
        let tag_bytes_len = fixed_bytes_to_u64(cursor.take(8, "tag bytes length")?)?;
        let tag_bytes_len = usize::try_from(tag_bytes_len)
            .map_err(|_| malformed("tag bytes length overflows"))?;
        let tags = deserialize_tags(cursor.take(tag_bytes_len, "tags")?)?;
        if tags.len() as u64 != tag_count {
            return Err(malformed(&format!(
                "header declares {} tags, found {}",
                tag_count,
                tags.len()
            )));
        }

        let data = raw.slice(cursor.pos..);

        Ok(DataItem {
            signature_type,
            signature,
            owner,
            target,
            anchor,
            tags,
            data,
        })
    }

    /// A JSON-friendly view with base64url binary fields.
    pub fn to_json(&self) -> DataItemJson {
        DataItemJson {
            id: self.id(),
            signature_type: self.signature_type.to_u16(),
            signature: base64url_encode(&self.signature),
            owner: base64url_encode(&self.owner),
            target: self.target.map(|t| base64url_encode(&t)).unwrap_or_default(),
            anchor: self.anchor.map(|a| base64url_encode(&a)).unwrap_or_default(),
            tags: self.tags.clone(),
            data: base64url_encode(&self.data),
        }
    }
}

/// Serializable summary of a data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataItemJson {
    pub id: ItemId,
    pub signature_type: u16,
    pub signature: String,
    pub owner: String,
    pub target: String,
    pub anchor: String,
    pub tags: Vec<Tag>,
    pub data: String,
}

struct Cursor<'a> {
    raw: &'a Bytes,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.raw.len())
            .ok_or_else(|| {
                malformed(&format!(
                    "truncated at {}: need {} bytes at offset {}, have {}",
                    field,
                    len,
                    self.pos,
                    self.raw.len().saturating_sub(self.pos)
                ))
            })?;
        let raw: &'a Bytes = self.raw;
        let slice = &raw[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_bytes(&mut self, len: usize, field: &str) -> Result<Bytes> {
        let start = self.pos;
        self.take(len, field)?;
        Ok(self.raw.slice(start..self.pos))
    }

    fn take_optional(&mut self, field: &str) -> Result<Option<[u8; 32]>> {
        match self.take(1, field)?[0] {
            0 => Ok(None),
            1 => {
                let bytes = self.take(32, field)?;
                let mut arr = [0u8; 32];
                arr.copy_from_slice(bytes);
                Ok(Some(arr))
            }
            flag => Err(malformed(&format!("{} presence flag is {}", field, flag))),
        }
    }
}

fn malformed(reason: &str) -> CodecError {
    CodecError::InvalidDataItemFormat(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha256Hash;
    use crate::signer::{Ed25519Signer, EthereumSigner};

    fn ed_signer() -> Ed25519Signer {
        Ed25519Signer::from_seed(&[0x42; 32])
    }

    async fn signed_item(options: DataItemOptions, data: &[u8]) -> DataItem {
        let mut signer = ed_signer();
        let mut item = create_data(data.to_vec(), &signer, options).unwrap();
        item.sign(&mut signer).await.unwrap();
        item
    }

    fn full_options() -> DataItemOptions {
        DataItemOptions::default()
            .tag("Content-Type", "text/plain")
            .tag("App-Name", "test")
            .tag("App-Name", "duplicate")
            .target(vec![0x11; 32])
            .anchor(vec![0x22; 32])
    }

    #[test]
    fn test_create_data_is_unsigned() {
        let signer = ed_signer();
        let item = create_data(b"hello".to_vec(), &signer, DataItemOptions::default()).unwrap();

        assert_eq!(item.signature_type, SignatureType::Ed25519);
        assert_eq!(item.owner.as_ref(), signer.public_key());
        assert!(!item.is_signed());
        assert!(matches!(item.signed_id(), Err(CodecError::MissingDataItemId)));
        assert!(!item.is_valid());
    }

    #[test]
    fn test_create_data_rejects_bad_fields() {
        let signer = ed_signer();
        assert!(matches!(
            create_data(vec![], &signer, DataItemOptions::default().target(vec![1; 31])),
            Err(CodecError::InvalidTarget(31))
        ));
        assert!(matches!(
            create_data(vec![], &signer, DataItemOptions::default().anchor(vec![1; 33])),
            Err(CodecError::InvalidAnchor(33))
        ));
        assert!(matches!(
            create_data(vec![], &signer, DataItemOptions::default().tag("", "v")),
            Err(CodecError::InvalidTags(_))
        ));
    }

    #[test]
    fn test_empty_target_and_anchor_mean_absent() {
        let signer = ed_signer();
        let item = create_data(
            vec![],
            &signer,
            DataItemOptions::default().target(vec![]).anchor(vec![]),
        )
        .unwrap();
        assert_eq!(item.target, None);
        assert_eq!(item.anchor, None);
    }

    #[tokio::test]
    async fn test_signed_item_is_valid() {
        let item = signed_item(full_options(), b"payload").await;

        assert!(item.is_signed());
        assert!(item.is_valid());
        assert_eq!(item.id().0, Sha256Hash::hash(&item.signature).0);
        assert_eq!(
            item.id().to_base64url(),
            base64url_encode(Sha256Hash::hash(&item.signature).as_bytes())
        );
    }

    #[tokio::test]
    async fn test_tamper_detection() {
        let item = signed_item(full_options(), b"payload").await;

        let mut tampered = item.clone();
        tampered.data = Bytes::from_static(b"paylobd");
        assert!(!tampered.is_valid());

        let mut tampered = item.clone();
        tampered.tags[1].value = "tesu".into();
        assert!(!tampered.is_valid());

        let mut tampered = item.clone();
        tampered.tags.swap(1, 2);
        assert!(!tampered.is_valid());

        let mut tampered = item.clone();
        if let Some(target) = tampered.target.as_mut() {
            target[0] ^= 0x01;
        }
        assert!(!tampered.is_valid());

        let mut tampered = item.clone();
        if let Some(anchor) = tampered.anchor.as_mut() {
            anchor[31] ^= 0x80;
        }
        assert!(!tampered.is_valid());

        let mut tampered = item.clone();
        tampered.anchor = None;
        assert!(!tampered.is_valid());
    }

    #[tokio::test]
    async fn test_raw_roundtrip() {
        let item = signed_item(full_options(), b"payload").await;
        let raw = item.to_bytes().unwrap();
        assert_eq!(raw.len(), item.encoded_len());

        let decoded = DataItem::from_bytes(raw.clone()).unwrap();
        assert_eq!(decoded, item);
        assert_eq!(decoded.id(), item.id());
        assert!(decoded.is_valid());
        assert!(DataItem::verify_bytes(&raw));
    }

    #[tokio::test]
    async fn test_minimal_layout() {
        let item = signed_item(DataItemOptions::default(), b"a").await;
        let raw = item.to_bytes().unwrap();

        // 2 + 64 + 32 + 1 + 1 + 8 + 8 + 0 + 1
        assert_eq!(raw.len(), 117);
        assert_eq!(&raw[..2], &[0x02, 0x00]);
        assert_eq!(raw[98], 0);
        assert_eq!(raw[99], 0);
        assert!(raw[100..116].iter().all(|b| *b == 0));
        assert_eq!(raw[116], b'a');
    }

    #[tokio::test]
    async fn test_ethereum_item() {
        let mut signer = EthereumSigner::from_secret(&[0x55; 32]).unwrap();
        let mut item = create_data(b"bb".to_vec(), &signer, full_options()).unwrap();
        item.sign(&mut signer).await.unwrap();

        assert!(item.is_valid());
        let decoded = DataItem::from_bytes(item.to_bytes().unwrap()).unwrap();
        assert!(decoded.is_valid());
        assert_eq!(decoded.owner.len(), 65);
    }

    #[tokio::test]
    async fn test_decode_errors() {
        let item = signed_item(full_options(), b"payload").await;
        let raw = item.to_bytes().unwrap();

        // Truncated inside the header.
        assert!(matches!(
            DataItem::from_bytes(raw[..50].to_vec()),
            Err(CodecError::InvalidDataItemFormat(_))
        ));
        assert!(matches!(
            DataItem::from_bytes(vec![0x02]),
            Err(CodecError::InvalidDataItemFormat(_))
        ));

        // Unknown signature type.
        let mut bad = raw.clone();
        bad[0] = 0x09;
        assert!(matches!(
            DataItem::from_bytes(bad),
            Err(CodecError::UnsupportedSignatureType(9))
        ));

        // Invalid target presence flag.
        let mut bad = raw.clone();
        bad[2 + 64 + 32] = 2;
        assert!(matches!(
            DataItem::from_bytes(bad),
            Err(CodecError::InvalidDataItemFormat(_))
        ));

        // Tag count disagrees with the encoded tags.
        let mut bad = raw.clone();
        let count_offset = 2 + 64 + 32 + 33 + 33;
        bad[count_offset] = 7;
        assert!(matches!(
            DataItem::from_bytes(bad),
            Err(CodecError::InvalidDataItemFormat(_))
        ));

        // Tag byte length runs past the end.
        let mut bad = raw.clone();
        bad[count_offset + 8..count_offset + 16].copy_from_slice(&long_to_8_bytes(1 << 40));
        assert!(matches!(
            DataItem::from_bytes(bad),
            Err(CodecError::InvalidDataItemFormat(_))
        ));

        // Dropping the last data byte still decodes but breaks the signature.
        assert!(!DataItem::verify_bytes(&raw[..raw.len() - 1]));
    }

    #[tokio::test]
    async fn test_zeroed_signature_invalid() {
        let mut item = signed_item(DataItemOptions::default(), b"a").await;
        item.signature = Bytes::from(vec![0u8; 64]);
        assert!(!item.is_valid());
        assert!(!item.is_signed());
    }

    #[tokio::test]
    async fn test_to_json() {
        let item = signed_item(full_options(), b"payload").await;
        let json = item.to_json();

        assert_eq!(json.id, item.id());
        assert_eq!(json.signature_type, 2);
        assert_eq!(json.data, base64url_encode(b"payload"));
        assert_eq!(json.tags.len(), 3);

        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains("\"signatureType\":2"));
        let back: DataItemJson = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_unsigned_keyless_item_cannot_encode() {
        let signer = ed_signer();
        let mut item = create_data(vec![], &signer, DataItemOptions::default()).unwrap();
        item.owner = Bytes::new();
        assert!(item.to_bytes().is_err());
    }
}
