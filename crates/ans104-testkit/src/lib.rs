//! # ANS-104 Testkit
//!
//! Testing utilities for ANS-104 data items and bundles.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known items with expected payload hashes, lengths and ids
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Deterministic signers, signed items, bundles and scripted wallets
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ans104_testkit::vectors::{all_vectors, generate_item_from_vector};
//!
//! for vector in all_vectors() {
//!     let item = generate_item_from_vector(&vector);
//!     assert_eq!(item.id().to_base64url(), vector.expected_id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ans104_testkit::generators::{item_from_params, ItemParams};
//!
//! proptest! {
//!     #[test]
//!     fn signed_items_are_valid(params: ItemParams) {
//!         prop_assert!(item_from_params(&params).is_valid());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ans104_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::with_seed([0x42; 32]);
//! let bundle = fixture.bundle(&[b"a", b"bb"]);
//! assert!(bundle.verify());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    arweave_signer, multi_party_fixtures, RejectingWallet, ScriptedWallet, TestFixture,
};
pub use generators::{item_from_params, ItemParams};
pub use vectors::{all_vectors, generate_item_from_vector, verify_all_vectors, GoldenVector};
