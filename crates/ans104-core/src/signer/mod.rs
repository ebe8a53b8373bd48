//! Signers: the capability that produces the signature of a data item.
//!
//! A [`Signer`] exposes its public key (the item's owner) and signs arbitrary
//! bytes. Local signers hold their key material and are keyed from
//! construction. An [`InjectedEthereumSigner`] delegates to an external wallet
//! and starts keyless until [`Signer::set_public_key`] recovers the key.
//!
//! Verification is not a signer method: it is a static, scheme-level check in
//! [`crate::scheme`].

use async_trait::async_trait;

use crate::error::SignerError;
use crate::scheme::SignatureType;

pub mod arweave;
pub mod ed25519;
pub mod ethereum;
pub mod injected;

pub use arweave::ArweaveSigner;
pub use ed25519::Ed25519Signer;
pub use ethereum::EthereumSigner;
pub use injected::{InjectedEthereumSigner, MessageSigner, CHALLENGE_MESSAGE};

/// Result type for signer operations.
pub type Result<T> = std::result::Result<T, SignerError>;

/// A capability that signs data item payloads.
///
/// Methods that may change state take `&mut self`: a signer must not be used
/// by two signing operations at once.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The scheme this signer produces signatures for.
    fn signature_type(&self) -> SignatureType;

    /// The owner bytes. Empty until the signer is keyed.
    fn public_key(&self) -> &[u8];

    /// Owner slot width for this signer's scheme.
    fn owner_length(&self) -> usize {
        self.signature_type().scheme().owner_length
    }

    /// Signature slot width for this signer's scheme.
    fn signature_length(&self) -> usize {
        self.signature_type().scheme().signature_length
    }

    /// Whether the public key is known.
    fn is_keyed(&self) -> bool {
        !self.public_key().is_empty()
    }

    /// Make the public key available. Local signers are always keyed.
    async fn set_public_key(&mut self) -> Result<()> {
        Ok(())
    }

    /// Sign `message` and return the raw signature bytes.
    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>>;
}

#[async_trait]
impl<S: Signer + ?Sized> Signer for Box<S> {
    fn signature_type(&self) -> SignatureType {
        (**self).signature_type()
    }

    fn public_key(&self) -> &[u8] {
        (**self).public_key()
    }

    async fn set_public_key(&mut self) -> Result<()> {
        (**self).set_public_key().await
    }

    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(message).await
    }
}
