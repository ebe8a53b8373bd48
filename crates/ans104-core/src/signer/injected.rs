//! Signers backed by an external wallet.
//!
//! The wallet only knows how to `personal_sign` a message and hand back a hex
//! signature. The public key is never exposed directly: it is recovered once
//! from the wallet's signature over a fixed challenge.

use async_trait::async_trait;
use std::fmt;

use super::ethereum::{self, hash_message, recover_public_key};
use super::{Result, Signer};
use crate::error::SignerError;
use crate::scheme::SignatureType;

/// Challenge signed to recover a wallet's public key.
///
/// Must never change: wallets display it to the user, and a stable text keeps
/// repeated recoveries deterministic for one wallet session.
pub const CHALLENGE_MESSAGE: &str = "sign this message to connect to Bundlr.Network";

/// An external signing capability, typically a browser or hardware wallet.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Sign `message` as a personal message; returns a hex signature
    /// (`0x` prefix optional).
    ///
    /// A user rejection must be reported as [`SignerError::UserDeclined`].
    async fn sign_message(&self, message: &[u8]) -> Result<String>;
}

/// Decode a wallet's hex signature into raw bytes.
pub fn decode_hex_signature(signature: &str) -> Result<Vec<u8>> {
    let trimmed = signature.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| SignerError::InvalidSignatureEncoding(e.to_string()))
}

enum KeyState {
    Keyless,
    Keyed(Vec<u8>),
}

/// An Ethereum signer that delegates every signature to a wallet.
///
/// Starts keyless. The first [`Signer::set_public_key`] (or the first
/// [`Signer::sign`]) asks the wallet to sign [`CHALLENGE_MESSAGE`] and recovers
/// the public key from the answer; the key is fixed from then on.
pub struct InjectedEthereumSigner<M> {
    wallet: M,
    state: KeyState,
}

impl<M: MessageSigner> InjectedEthereumSigner<M> {
    /// Bind a keyless signer to a wallet.
    pub fn new(wallet: M) -> Self {
        Self {
            wallet,
            state: KeyState::Keyless,
        }
    }

    /// The underlying wallet.
    pub fn wallet(&self) -> &M {
        &self.wallet
    }

    async fn recover_key(&self) -> Result<Vec<u8>> {
        let answer = self.wallet.sign_message(CHALLENGE_MESSAGE.as_bytes()).await?;
        let signature = decode_hex_signature(&answer)?;
        let key = recover_public_key(&hash_message(CHALLENGE_MESSAGE.as_bytes()), &signature)?;
        Ok(ethereum::uncompressed_public_key(&key))
    }
}

impl<M> fmt::Debug for InjectedEthereumSigner<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            KeyState::Keyless => write!(f, "InjectedEthereumSigner(keyless)"),
            KeyState::Keyed(pk) => {
                write!(f, "InjectedEthereumSigner({}...)", &hex::encode(pk)[..10])
            }
        }
    }
}

#[async_trait]
impl<M: MessageSigner> Signer for InjectedEthereumSigner<M> {
    fn signature_type(&self) -> SignatureType {
        SignatureType::Ethereum
    }

    fn public_key(&self) -> &[u8] {
        match &self.state {
            KeyState::Keyless => &[],
            KeyState::Keyed(pk) => pk,
        }
    }

    async fn set_public_key(&mut self) -> Result<()> {
        if let KeyState::Keyed(_) = self.state {
            return Ok(());
        }
        let key = self.recover_key().await?;
        tracing::debug!(public_key = %hex::encode(&key), "recovered wallet public key");
        self.state = KeyState::Keyed(key);
        Ok(())
    }

    async fn sign(&mut self, message: &[u8]) -> Result<Vec<u8>> {
        self.set_public_key().await?;

        let answer = self.wallet.sign_message(message).await?;
        let signature = decode_hex_signature(&answer)?;
        if signature.len() != ethereum::SIGNATURE_LENGTH {
            return Err(SignerError::InvalidSignatureEncoding(format!(
                "wallet returned {} bytes, expected {}",
                signature.len(),
                ethereum::SIGNATURE_LENGTH
            )));
        }
        Ok(signature)
    }
}
