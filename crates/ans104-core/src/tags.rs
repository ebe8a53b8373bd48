//! Tag encoding: the Avro binary form of `array<record { name: bytes, value: bytes }>`.
//!
//! Longs are zigzag varints; every byte string is length-prefixed. A non-empty
//! array is written as one block (`count`, records, `0` terminator). An empty
//! tag list is encoded as zero bytes.
//!
//! The decoder also accepts the other block shapes Avro writers may produce:
//! multiple blocks, and negative block counts followed by a block byte size.

use crate::error::{CodecError, Result};
use crate::types::Tag;

/// Maximum number of tags on a data item.
pub const MAX_TAG_COUNT: usize = 128;

/// Maximum tag name length in bytes.
pub const MAX_TAG_NAME_BYTES: usize = 1024;

/// Maximum tag value length in bytes.
pub const MAX_TAG_VALUE_BYTES: usize = 3072;

/// Encode tags to their wire form.
pub fn serialize_tags(tags: &[Tag]) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }

    let mut buf = Vec::new();
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    buf
}

/// Decode tags from their wire form. The whole input must be consumed.
pub fn deserialize_tags(bytes: &[u8]) -> Result<Vec<Tag>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = Reader { bytes, pos: 0 };
    let mut tags = Vec::new();

    let mut count = reader.read_long()?;
    while count != 0 {
        if count < 0 {
            count = count
                .checked_neg()
                .ok_or_else(|| malformed("block count out of range"))?;
            // Block byte size; only useful for skipping.
            reader.read_long()?;
        }
        for _ in 0..count {
            let name = reader.read_string()?;
            let value = reader.read_string()?;
            tags.push(Tag { name, value });
        }
        count = reader.read_long()?;
    }

    if reader.pos != bytes.len() {
        return Err(malformed("trailing bytes after tag array"));
    }
    Ok(tags)
}

/// Check tags against the ANS-104 limits.
pub fn verify_tags(tags: &[Tag]) -> Result<()> {
    if tags.len() > MAX_TAG_COUNT {
        return Err(CodecError::InvalidTags(format!(
            "{} tags exceeds maximum of {}",
            tags.len(),
            MAX_TAG_COUNT
        )));
    }

    for (i, tag) in tags.iter().enumerate() {
        let name_len = tag.name.len();
        if name_len == 0 || name_len > MAX_TAG_NAME_BYTES {
            return Err(CodecError::InvalidTags(format!(
                "tag {} name length {} outside 1..={}",
                i, name_len, MAX_TAG_NAME_BYTES
            )));
        }
        let value_len = tag.value.len();
        if value_len == 0 || value_len > MAX_TAG_VALUE_BYTES {
            return Err(CodecError::InvalidTags(format!(
                "tag {} value length {} outside 1..={}",
                i, value_len, MAX_TAG_VALUE_BYTES
            )));
        }
    }
    Ok(())
}

fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z >= 0x80 {
        buf.push((z as u8) | 0x80);
        z >>= 7;
    }
    buf.push(z as u8);
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn read_long(&mut self) -> Result<i64> {
        let mut z: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = *self
                .bytes
                .get(self.pos)
                .ok_or_else(|| malformed("truncated varint"))?;
            self.pos += 1;
            if shift >= 64 {
                return Err(malformed("varint too long"));
            }
            z |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(((z >> 1) as i64) ^ -((z & 1) as i64))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_long()?;
        let len = usize::try_from(len).map_err(|_| malformed("negative byte length"))?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| malformed("byte string runs past end of tags"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        String::from_utf8(slice.to_vec()).map_err(|_| malformed("tag is not valid UTF-8"))
    }
}

fn malformed(reason: &str) -> CodecError {
    CodecError::InvalidDataItemFormat(format!("tags: {}", reason))
}
