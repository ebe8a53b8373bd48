//! Golden test vectors for deterministic verification.
//!
//! Ed25519 signatures are deterministic, so a seed plus item fields pin down
//! the signed payload, the raw encoding and the id. These values were produced
//! by an independent encoder and must never change.

use serde::Serialize;

use ans104_core::{DataItemOptions, Ed25519Signer, Tag};

use crate::fixtures::sign_ed25519;

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Ed25519 seed.
    pub seed: [u8; 32],
    /// Tags, in order.
    pub tags: &'static [(&'static str, &'static str)],
    pub target: Option<[u8; 32]>,
    pub anchor: Option<[u8; 32]>,
    /// Payload bytes.
    pub data: &'static [u8],
    /// Expected owner (hex).
    pub expected_owner: &'static str,
    /// Expected deep hash of the signed payload (hex).
    pub expected_signature_data: &'static str,
    /// Expected raw item length.
    pub expected_len: usize,
    /// Expected item id (base64url).
    pub expected_id: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty item",
            seed: [0x00; 32],
            tags: &[],
            target: None,
            anchor: None,
            data: b"",
            expected_owner: "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29",
            expected_signature_data: "4ec9e4e7e118f6accf0a38bee985759e00cdd03a79f6460320173a9ad197383d3f49f2bf5a33579cbb84390972d18ce9",
            expected_len: 116,
            expected_id: "WdxUE9yEg8t-RdNG6EtyjMvl0RW1xGOIS6jRVKg0-tY",
        },
        GoldenVector {
            name: "hello with content type",
            seed: [0x42; 32],
            tags: &[("Content-Type", "text/plain")],
            target: None,
            anchor: None,
            data: b"hello",
            expected_owner: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            expected_signature_data: "94e4a2705c53553522e84ccda74f53d399eef74a740f187969e95fb8e693085da3c943e178b042f97027c55394d27d9a",
            expected_len: 147,
            expected_id: "lmEnFKO2VLty4Lr9A_Azva2il_JbsPiPBkJfySstidA",
        },
        GoldenVector {
            name: "target, anchor and duplicate tags",
            seed: [0x07; 32],
            tags: &[("App-Name", "ans104"), ("App-Name", "dup")],
            target: Some([0x11; 32]),
            anchor: Some([0x22; 32]),
            data: b"bundled",
            expected_owner: "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c",
            expected_signature_data: "0f838ca5cf349e1f63b67ec02c9f4d7431e63bce0c3dfbd2a3566fbe668fb9b4037fbee5e516e2baf09f29aa179afe07",
            expected_len: 218,
            expected_id: "tK_Lw6sZtOXo6zEOsxpbb7A1IeAQxgX55Paa6d0tgDo",
        },
    ]
}

/// Generate the signed item described by a golden vector.
pub fn generate_item_from_vector(vector: &GoldenVector) -> ans104_core::DataItem {
    let signer = Ed25519Signer::from_seed(&vector.seed);
    let mut options = DataItemOptions::default().tags(
        vector
            .tags
            .iter()
            .map(|(name, value)| Tag::new(*name, *value))
            .collect(),
    );
    if let Some(target) = vector.target {
        options = options.target(target.to_vec());
    }
    if let Some(anchor) = vector.anchor {
        options = options.anchor(anchor.to_vec());
    }

    let mut item = ans104_core::create_data(vector.data.to_vec(), &signer, options)
        .expect("vector options are valid");
    sign_ed25519(&mut item, &signer);
    item
}

/// Check every vector; returns `(name, matches, actual id)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let item = generate_item_from_vector(v);
            let id = item.id().to_base64url();
            let matches = id == v.expected_id
                && hex::encode(&item.owner) == v.expected_owner
                && item.signature_data().to_hex() == v.expected_signature_data
                && item.encoded_len() == v.expected_len;
            (v.name.to_string(), matches, id)
        })
        .collect()
}

/// All vectors as pretty JSON, for sharing with other implementations.
pub fn vectors_json() -> String {
    serde_json::to_string_pretty(&all_vectors()).expect("vectors serialize")
}
