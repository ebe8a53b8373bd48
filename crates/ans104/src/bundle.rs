//! Bundle: an immutable, indexed view over a bundle binary.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! item count N                      32 bytes
//! N x (item size 32 | item id 32)   64 * N bytes
//! item bytes, in header order       sum of sizes
//! ```
//!
//! The header table is walked once at construction into an offset index. Every
//! lookup afterwards is a slice of the shared buffer.

use std::path::Path;

use ans104_core::byte_array::fixed_bytes_to_int;
use ans104_core::{DataItem, ItemId};
use bytes::Bytes;

use crate::config::BundleConfig;
use crate::error::{BundleError, Result};

/// Width of the leading item count.
pub const COUNT_LENGTH: usize = 32;

/// Width of one header entry: 32-byte size then 32-byte id.
pub const HEADER_ENTRY_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeaderEntry {
    offset: usize,
    size: usize,
    id: ItemId,
}

/// A parsed bundle.
///
/// Cloning is cheap: the binary is reference counted and the index is small.
#[derive(Debug, Clone)]
pub struct Bundle {
    binary: Bytes,
    entries: Vec<HeaderEntry>,
}

impl Bundle {
    /// Parse a bundle with the default configuration.
    pub fn from_bytes(binary: impl Into<Bytes>) -> Result<Self> {
        Self::with_config(binary, &BundleConfig::default())
    }

    /// Parse a bundle.
    ///
    /// Fails with [`BundleError::InvalidBundle`] if the declared count exceeds
    /// `config.max_items`, the header table or any item runs past the end of
    /// the buffer, or bytes are left over after the last item. With
    /// `verify_on_load`, a bundle that does not [`verify`](Self::verify) is
    /// rejected too.
    pub fn with_config(binary: impl Into<Bytes>, config: &BundleConfig) -> Result<Self> {
        let binary: Bytes = binary.into();

        if binary.len() < COUNT_LENGTH {
            return Err(BundleError::InvalidBundle(format!(
                "{} bytes is shorter than the {}-byte item count",
                binary.len(),
                COUNT_LENGTH
            )));
        }

        let count = fixed_bytes_to_int(&binary[..COUNT_LENGTH])
            .map_err(|_| BundleError::InvalidBundle("item count overflows".into()))?;
        if count > u128::from(config.max_items) {
            return Err(BundleError::InvalidBundle(format!(
                "declares {} items, limit is {}",
                count, config.max_items
            )));
        }

        let header_end = COUNT_LENGTH as u128 + HEADER_ENTRY_LENGTH as u128 * count;
        if header_end > binary.len() as u128 {
            return Err(BundleError::InvalidBundle(format!(
                "header table for {} items needs {} bytes, buffer has {}",
                count,
                header_end,
                binary.len()
            )));
        }
        // Both fit in usize now: they are bounded by the buffer length.
        let count = count as usize;
        let mut offset = header_end as usize;

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let slot = COUNT_LENGTH + index * HEADER_ENTRY_LENGTH;
            let size = fixed_bytes_to_int(&binary[slot..slot + 32])
                .ok()
                .filter(|size| *size <= (binary.len() - offset) as u128)
                .ok_or_else(|| {
                    BundleError::InvalidBundle(format!(
                        "item {} at offset {} runs past the end of the bundle",
                        index, offset
                    ))
                })? as usize;

            let mut id = [0u8; 32];
            id.copy_from_slice(&binary[slot + 32..slot + HEADER_ENTRY_LENGTH]);

            entries.push(HeaderEntry {
                offset,
                size,
                id: ItemId::from_bytes(id),
            });
            offset += size;
        }

        if offset != binary.len() {
            return Err(BundleError::InvalidBundle(format!(
                "{} trailing bytes after the last item",
                binary.len() - offset
            )));
        }

        let bundle = Self { binary, entries };
        if config.verify_on_load && !bundle.verify() {
            return Err(BundleError::InvalidBundle(
                "bundle failed verification on load".into(),
            ));
        }
        Ok(bundle)
    }

    /// Read and parse a bundle file with the default configuration.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &BundleConfig::default()).await
    }

    /// Read and parse a bundle file.
    pub async fn open_with_config(path: impl AsRef<Path>, config: &BundleConfig) -> Result<Self> {
        let binary = tokio::fs::read(path.as_ref()).await?;
        tracing::debug!(path = %path.as_ref().display(), len = binary.len(), "read bundle file");
        Self::with_config(binary, config)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded size of each item, in header order.
    pub fn sizes(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.size).collect()
    }

    /// Header ids, in header order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Position of the first item whose header id is `id`.
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Raw bytes of the item at `index`.
    pub fn get_raw(&self, index: usize) -> Result<Bytes> {
        let entry = self.entry(index)?;
        Ok(self.binary.slice(entry.offset..entry.offset + entry.size))
    }

    /// Decode the item at `index`.
    pub fn get(&self, index: usize) -> Result<DataItem> {
        Ok(DataItem::from_bytes(self.get_raw(index)?)?)
    }

    /// Raw bytes of the first item whose header id is `id`.
    pub fn get_raw_by_id(&self, id: &ItemId) -> Result<Bytes> {
        let index = self
            .position(id)
            .ok_or(BundleError::TransactionNotFound(*id))?;
        self.get_raw(index)
    }

    /// Decode the first item whose header id is `id`.
    pub fn get_by_id(&self, id: &ItemId) -> Result<DataItem> {
        Ok(DataItem::from_bytes(self.get_raw_by_id(id)?)?)
    }

    /// Decode every item, in header order.
    pub fn items(&self) -> Result<Vec<DataItem>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Check every item: it must decode, pass [`DataItem::is_valid`], and its
    /// header id must equal SHA-256 of its signature.
    ///
    /// Stops at the first failing item.
    pub fn verify(&self) -> bool {
        for (index, entry) in self.entries.iter().enumerate() {
            let item = match self.get(index) {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(index, id = %entry.id, error = %e, "bundle item does not decode");
                    return false;
                }
            };
            if !item.is_valid() {
                tracing::warn!(index, id = %entry.id, "bundle item signature is invalid");
                return false;
            }
            if item.id() != entry.id {
                tracing::warn!(
                    index,
                    header_id = %entry.id,
                    item_id = %item.id(),
                    "bundle header id does not match item signature"
                );
                return false;
            }
        }
        true
    }

    /// The whole bundle binary.
    pub fn as_bytes(&self) -> &Bytes {
        &self.binary
    }

    pub fn into_bytes(self) -> Bytes {
        self.binary
    }

    fn entry(&self, index: usize) -> Result<&HeaderEntry> {
        self.entries.get(index).ok_or(BundleError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ans104_core::byte_array::long_to_32_bytes;

    fn header(count: u64) -> Vec<u8> {
        long_to_32_bytes(count).to_vec()
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = Bundle::from_bytes(header(0)).unwrap();
        assert!(bundle.is_empty());
        assert!(bundle.ids().is_empty());
        assert!(bundle.verify());
        assert!(matches!(
            bundle.get_raw(0),
            Err(BundleError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(matches!(
            Bundle::from_bytes(vec![0u8; 31]),
            Err(BundleError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_oversized_count_rejected() {
        // Declares 3 items but carries no header table.
        assert!(matches!(
            Bundle::from_bytes(header(3)),
            Err(BundleError::InvalidBundle(_))
        ));

        let mut huge = vec![0xffu8; 32];
        huge.extend_from_slice(&[0u8; 64]);
        assert!(matches!(
            Bundle::from_bytes(huge),
            Err(BundleError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_max_items_enforced() {
        let mut binary = header(2);
        binary.extend_from_slice(&[0u8; 128]);
        let config = BundleConfig {
            max_items: 1,
            ..BundleConfig::default()
        };
        assert!(matches!(
            Bundle::with_config(binary.clone(), &config),
            Err(BundleError::InvalidBundle(_))
        ));
        // Two zero-sized items are structurally fine under the default limit.
        assert_eq!(Bundle::from_bytes(binary).unwrap().len(), 2);
    }

    #[test]
    fn test_length_invariant() {
        let mut binary = header(1);
        binary.extend_from_slice(&long_to_32_bytes(3));
        binary.extend_from_slice(&[7u8; 32]);
        binary.extend_from_slice(b"abc");

        let bundle = Bundle::from_bytes(binary.clone()).unwrap();
        assert_eq!(bundle.sizes(), vec![3]);
        assert_eq!(bundle.ids(), vec![ItemId::from_bytes([7u8; 32])]);
        assert_eq!(bundle.get_raw(0).unwrap().as_ref(), b"abc");

        let mut trailing = binary.clone();
        trailing.push(0);
        assert!(matches!(
            Bundle::from_bytes(trailing),
            Err(BundleError::InvalidBundle(_))
        ));

        let truncated = binary[..binary.len() - 1].to_vec();
        assert!(matches!(
            Bundle::from_bytes(truncated),
            Err(BundleError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_first_match_wins() {
        let mut binary = header(2);
        binary.extend_from_slice(&long_to_32_bytes(1));
        binary.extend_from_slice(&[9u8; 32]);
        binary.extend_from_slice(&long_to_32_bytes(2));
        binary.extend_from_slice(&[9u8; 32]);
        binary.extend_from_slice(b"xyz");

        let bundle = Bundle::from_bytes(binary).unwrap();
        let id = ItemId::from_bytes([9u8; 32]);
        assert_eq!(bundle.position(&id), Some(0));
        assert_eq!(bundle.get_raw_by_id(&id).unwrap().as_ref(), b"x");
        assert_eq!(bundle.get_raw(1).unwrap().as_ref(), b"yz");

        let missing = ItemId::from_bytes([1u8; 32]);
        assert!(matches!(
            bundle.get_raw_by_id(&missing),
            Err(BundleError::TransactionNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_garbage_items_fail_verify() {
        let mut binary = header(1);
        binary.extend_from_slice(&long_to_32_bytes(4));
        binary.extend_from_slice(&[1u8; 32]);
        binary.extend_from_slice(&[2, 0, 0, 0]);

        let bundle = Bundle::from_bytes(binary.clone()).unwrap();
        assert!(!bundle.verify());
        assert!(bundle.get(0).is_err());
        assert!(matches!(
            Bundle::with_config(binary, &BundleConfig::verified()),
            Err(BundleError::InvalidBundle(_))
        ));
    }
}
