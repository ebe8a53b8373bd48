//! Deep hash: the tamper-evident digest of a nested list of byte strings.
//!
//! Each blob is hashed under a `"blob" + len` context tag and each list under
//! a `"list" + count` tag, with lengths written as ASCII decimal. A list folds
//! its children into a running SHA-384 accumulator, so a two-element list can
//! never collide with a single longer blob.
//!
//! **CRITICAL**: these tagging rules are the signed-payload contract of every
//! ANS-104 item. Changes invalidate all existing signatures.

use crate::crypto::Sha384Hash;

/// A node in a deep-hash input tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepHashChunk<'a> {
    Blob(&'a [u8]),
    List(Vec<DeepHashChunk<'a>>),
}

impl<'a> From<&'a [u8]> for DeepHashChunk<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        DeepHashChunk::Blob(bytes)
    }
}

/// Compute the deep hash of a chunk tree.
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> Sha384Hash {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = Sha384Hash::hash(format!("blob{}", data.len()).as_bytes());
            let body = Sha384Hash::hash(data);
            Sha384Hash::hash_parts(&[tag.as_bytes(), body.as_bytes()])
        }
        DeepHashChunk::List(children) => {
            let tag = format!("list{}", children.len());
            children
                .iter()
                .fold(Sha384Hash::hash(tag.as_bytes()), |acc, child| {
                    let child_hash = deep_hash(child);
                    Sha384Hash::hash_parts(&[acc.as_bytes(), child_hash.as_bytes()])
                })
        }
    }
}
