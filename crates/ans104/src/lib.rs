//! # ANS-104
//!
//! Bundles of signed data items: parse, index, verify, and build them.
//!
//! ## Overview
//!
//! - **Data items**: signed, tagged payloads addressed by the SHA-256 of their
//!   signature (see [`core::data_item`])
//! - **Bundles**: one binary packing many data items behind a size/id header
//!   table, with random access by position or id
//! - **Signers**: pluggable signature schemes, including keyless wallet-backed
//!   signers (see [`core::signer`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ans104::{bundle_and_sign, Bundle};
//! use ans104::core::{create_data, DataItemOptions, Ed25519Signer};
//!
//! async fn example() -> ans104::Result<()> {
//!     let mut signer = Ed25519Signer::generate();
//!
//!     let item = create_data(
//!         b"hello".to_vec(),
//!         &signer,
//!         DataItemOptions::default().tag("Content-Type", "text/plain"),
//!     )?;
//!
//!     let bundle = bundle_and_sign(vec![item], &mut signer).await?;
//!     assert!(bundle.verify());
//!
//!     let reparsed = Bundle::from_bytes(bundle.as_bytes().clone())?;
//!     let id = reparsed.ids()[0];
//!     let item = reparsed.get_by_id(&id)?;
//!     assert_eq!(item.data.as_ref(), b"hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ans104::core` - Data items, tags, schemes and signers

pub mod builder;
pub mod bundle;
pub mod config;
pub mod error;
pub mod transaction;

pub use ans104_core as core;

pub use builder::{bundle_and_sign, bundle_items};
pub use bundle::Bundle;
pub use config::BundleConfig;
pub use error::{BundleError, Result};
pub use transaction::{LedgerClient, TransactionAttributes};

pub use ans104_core::{
    create_data, DataItem, DataItemOptions, ItemId, SignatureType, Signer, Tag,
};
