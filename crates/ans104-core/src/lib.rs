//! # ANS-104 Core
//!
//! Primitives for ANS-104 data items: fixed-width integer codecs, hashing,
//! the deep hash, the tag codec, the signature-scheme registry, signers, and
//! the data-item codec itself.
//!
//! Everything here is pure computation except the [`Signer`] seam, which is
//! async so that external wallets can sit behind it.
//!
//! ## Key Types
//!
//! - [`DataItem`] - A signed, tagged payload
//! - [`ItemId`] - Content-addressed identifier (SHA-256 of the signature)
//! - [`SignatureType`] / [`SignatureScheme`] - Registered signature schemes
//! - [`Signer`] - The capability that signs items
//!
//! ## Wire format
//!
//! See [`data_item`] for the item layout and [`tags`] for the tag encoding.

pub mod byte_array;
pub mod crypto;
pub mod data_item;
pub mod deep_hash;
pub mod error;
pub mod scheme;
pub mod signer;
pub mod tags;
pub mod types;

pub use crypto::{base64url_decode, base64url_encode, Sha256Hash, Sha384Hash};
pub use data_item::{create_data, DataItem, DataItemJson, DataItemOptions};
pub use deep_hash::{deep_hash, DeepHashChunk};
pub use error::{CodecError, Result, SignerError};
pub use scheme::{signer_from_secret, verify, SignatureScheme, SignatureType};
pub use signer::{
    ArweaveSigner, Ed25519Signer, EthereumSigner, InjectedEthereumSigner, MessageSigner, Signer,
};
pub use tags::{deserialize_tags, serialize_tags, verify_tags};
pub use types::{ItemId, Tag};
