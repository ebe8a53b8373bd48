//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ans104_core::tags::{MAX_TAG_NAME_BYTES, MAX_TAG_VALUE_BYTES};
use ans104_core::{create_data, DataItem, DataItemOptions, Ed25519Signer, ItemId, Tag};

use crate::fixtures::sign_ed25519;

/// Generate a random Ed25519 signer.
pub fn ed25519_signer() -> impl Strategy<Value = Ed25519Signer> {
    any::<[u8; 32]>().prop_map(|seed| Ed25519Signer::from_seed(&seed))
}

/// Generate a random ItemId.
pub fn item_id() -> impl Strategy<Value = ItemId> {
    any::<[u8; 32]>().prop_map(ItemId::from_bytes)
}

/// Generate a tag within the size limits, including multi-byte UTF-8.
pub fn tag() -> impl Strategy<Value = Tag> {
    ("[a-zA-Z][a-zA-Z0-9-]{0,31}", "\\PC{1,64}").prop_map(|(name, value)| Tag::new(name, value))
}

/// Generate a tag with a name or value at its maximum length.
pub fn large_tag() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::new("n".repeat(MAX_TAG_NAME_BYTES), "v")),
        Just(Tag::new("n", "v".repeat(MAX_TAG_VALUE_BYTES))),
    ]
}

/// Generate up to `max` tags. Duplicates are possible and intended.
pub fn tags(max: usize) -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(tag(), 0..=max)
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Parameters for generating a data item.
#[derive(Debug, Clone)]
pub struct ItemParams {
    pub seed: [u8; 32],
    pub tags: Vec<Tag>,
    pub target: Option<[u8; 32]>,
    pub anchor: Option<[u8; 32]>,
    pub data: Vec<u8>,
}

impl Arbitrary for ItemParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            tags(8),
            any::<Option<[u8; 32]>>(),
            any::<Option<[u8; 32]>>(),
            payload(512),
        )
            .prop_map(|(seed, tags, target, anchor, data)| ItemParams {
                seed,
                tags,
                target,
                anchor,
                data,
            })
            .boxed()
    }
}

/// Build a signed Ed25519 item from parameters.
pub fn item_from_params(params: &ItemParams) -> DataItem {
    let signer = Ed25519Signer::from_seed(&params.seed);
    let mut options = DataItemOptions::default().tags(params.tags.clone());
    if let Some(target) = params.target {
        options = options.target(target.to_vec());
    }
    if let Some(anchor) = params.anchor {
        options = options.anchor(anchor.to_vec());
    }

    let mut item = create_data(params.data.clone(), &signer, options)
        .expect("generated options are within limits");
    sign_ed25519(&mut item, &signer);
    item
}
