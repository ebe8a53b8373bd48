//! Fixed-width little-endian integer conversions.
//!
//! Every integer on the ANS-104 wire is little-endian and occupies a fixed
//! slot: 2 bytes for the signature type, 8 bytes for tag counts and lengths,
//! 32 bytes for bundle counts and item sizes. Practical values fit in far fewer
//! bytes; the high bytes are simply zero.

use crate::error::{CodecError, Result};

/// Encode a non-negative integer into exactly `width` little-endian bytes.
///
/// Fails with [`CodecError::EncodingRange`] if `value` is negative or does not
/// fit in `width` bytes.
///
/// The input is an `i128`, so the encodable range is `0..=i128::MAX`
/// (`2^127 - 1`) at every width. For widths of 16 bytes and more that is
/// narrower than the slot; every value this crate writes (counts, sizes,
/// lengths) is a `u64`.
pub fn int_to_fixed_bytes(value: i128, width: usize) -> Result<Vec<u8>> {
    if value < 0 {
        return Err(range_error(value, width));
    }
    let unsigned = value as u128;
    if width < 16 && unsigned >> (8 * width) != 0 {
        return Err(range_error(value, width));
    }

    let mut out = vec![0u8; width];
    let le = unsigned.to_le_bytes();
    let n = width.min(le.len());
    out[..n].copy_from_slice(&le[..n]);
    Ok(out)
}

/// Decode little-endian bytes into an unsigned integer.
///
/// Slots of up to 16 bytes always decode. Wider slots (the 32-byte bundle
/// fields) decode as long as the value is below `2^128`; a non-zero byte past
/// index 15 fails with [`CodecError::EncodingRange`]. Nothing this crate
/// writes comes close to that bound.
pub fn fixed_bytes_to_int(bytes: &[u8]) -> Result<u128> {
    if bytes.len() > 16 && bytes[16..].iter().any(|b| *b != 0) {
        return Err(CodecError::EncodingRange {
            value: format!("0x{}", hex::encode(bytes.iter().rev().copied().collect::<Vec<_>>())),
            width: 16,
        });
    }
    Ok(bytes
        .iter()
        .take(16)
        .rev()
        .fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
}

/// Decode little-endian bytes that must fit in a `u64`.
pub fn fixed_bytes_to_u64(bytes: &[u8]) -> Result<u64> {
    let value = fixed_bytes_to_int(bytes)?;
    u64::try_from(value).map_err(|_| CodecError::EncodingRange {
        value: value.to_string(),
        width: 8,
    })
}

/// 2-byte slot (signature type).
pub fn short_to_2_bytes(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// 8-byte slot (tag count, tag byte length).
pub fn long_to_8_bytes(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// 16-byte slot.
pub fn long_to_16_bytes(value: u64) -> [u8; 16] {
    u128::from(value).to_le_bytes()
}

/// 32-byte slot (bundle item count, item size).
pub fn long_to_32_bytes(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..8].copy_from_slice(&value.to_le_bytes());
    out
}

fn range_error(value: i128, width: usize) -> CodecError {
    CodecError::EncodingRange {
        value: value.to_string(),
        width,
    }
}
