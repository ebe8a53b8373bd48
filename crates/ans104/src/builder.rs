//! Building bundles from data items.

use ans104_core::byte_array::long_to_32_bytes;
use ans104_core::{DataItem, Signer};

use crate::bundle::{Bundle, COUNT_LENGTH, HEADER_ENTRY_LENGTH};
use crate::error::Result;

/// Pack signed items into a bundle, preserving their order.
///
/// Every item must already be signed; an unsigned item fails with
/// [`CodecError::MissingDataItemId`](ans104_core::CodecError::MissingDataItemId).
pub fn bundle_items(items: &[DataItem]) -> Result<Bundle> {
    let mut headers = Vec::with_capacity(items.len() * HEADER_ENTRY_LENGTH);
    let mut body = Vec::new();

    for item in items {
        let id = item.signed_id()?;
        let raw = item.to_bytes()?;
        headers.extend_from_slice(&long_to_32_bytes(raw.len() as u64));
        headers.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&raw);
    }

    let mut binary = Vec::with_capacity(COUNT_LENGTH + headers.len() + body.len());
    binary.extend_from_slice(&long_to_32_bytes(items.len() as u64));
    binary.extend_from_slice(&headers);
    binary.extend_from_slice(&body);

    tracing::debug!(items = items.len(), len = binary.len(), "built bundle");
    Bundle::from_bytes(binary)
}

/// Sign every item with `signer`, then bundle them.
///
/// Items are signed one at a time, in order. If the signer fails (including a
/// user declining in their wallet) nothing is bundled.
pub async fn bundle_and_sign(mut items: Vec<DataItem>, signer: &mut dyn Signer) -> Result<Bundle> {
    for item in items.iter_mut() {
        item.sign(signer).await?;
    }
    bundle_items(&items)
}
