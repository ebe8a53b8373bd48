//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: deterministic signers, signed
//! items, ready-made bundles, and scripted wallets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use ans104::{bundle_items, Bundle};
use ans104_core::signer::{MessageSigner, Result as SignerResult};
use ans104_core::{
    create_data, ArweaveSigner, DataItem, DataItemOptions, Ed25519Signer, EthereumSigner, Signer,
    SignerError,
};
use async_trait::async_trait;
use bytes::Bytes;

/// A test fixture with one local signer per cheap scheme.
pub struct TestFixture {
    pub ed25519: Ed25519Signer,
    pub ethereum: EthereumSigner,
}

impl TestFixture {
    /// Create a new test fixture with random keys.
    pub fn new() -> Self {
        Self {
            ed25519: Ed25519Signer::generate(),
            ethereum: EthereumSigner::generate(),
        }
    }

    /// Create with deterministic keys from a seed.
    ///
    /// The seed must be a valid secp256k1 scalar (any non-zero seed below the
    /// curve order, e.g. `[0x42; 32]`).
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            ed25519: Ed25519Signer::from_seed(&seed),
            ethereum: EthereumSigner::from_secret(&seed).expect("seed is not a valid secp256k1 key"),
        }
    }

    /// An unsigned Ed25519 item.
    pub fn unsigned_item(&self, data: &[u8], options: DataItemOptions) -> DataItem {
        create_data(data.to_vec(), &self.ed25519, options).expect("invalid item options")
    }

    /// A signed Ed25519 item. Ed25519 is deterministic, so equal inputs give
    /// equal items.
    pub fn signed_item(&self, data: &[u8], options: DataItemOptions) -> DataItem {
        let mut item = self.unsigned_item(data, options);
        sign_ed25519(&mut item, &self.ed25519);
        item
    }

    /// A signed Ethereum item.
    pub async fn signed_ethereum_item(&mut self, data: &[u8], options: DataItemOptions) -> DataItem {
        let mut item =
            create_data(data.to_vec(), &self.ethereum, options).expect("invalid item options");
        item.sign(&mut self.ethereum)
            .await
            .expect("local ethereum signing failed");
        item
    }

    /// A bundle of signed Ed25519 items with the given payloads and no tags.
    pub fn bundle(&self, payloads: &[&[u8]]) -> Bundle {
        let items: Vec<DataItem> = payloads
            .iter()
            .map(|data| self.signed_item(data, DataItemOptions::default()))
            .collect();
        bundle_items(&items).expect("bundling signed items failed")
    }

    /// A wallet backed by this fixture's Ethereum key.
    pub fn wallet(&self) -> ScriptedWallet {
        ScriptedWallet::new(self.ethereum.clone())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A process-wide 4096-bit Arweave signer.
///
/// Generated on first use; RSA key generation is too slow to repeat per test.
pub fn arweave_signer() -> &'static ArweaveSigner {
    static SIGNER: OnceLock<ArweaveSigner> = OnceLock::new();
    SIGNER.get_or_init(|| ArweaveSigner::generate().expect("rsa key generation failed"))
}

/// Sign an item synchronously with an Ed25519 signer.
pub fn sign_ed25519(item: &mut DataItem, signer: &Ed25519Signer) {
    item.signature_type = signer.signature_type();
    item.owner = Bytes::copy_from_slice(signer.public_key());
    let signature = signer.sign_bytes(item.signature_data().as_bytes());
    item.signature = Bytes::copy_from_slice(&signature);
}

/// Create multiple test fixtures for multi-signer tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0x42u8; 32];
            seed[0] = i as u8 + 1;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A deterministic wallet that answers `personal_sign` with a local key and
/// counts how often it was asked.
pub struct ScriptedWallet {
    signer: EthereumSigner,
    calls: AtomicUsize,
}

impl ScriptedWallet {
    pub fn new(signer: EthereumSigner) -> Self {
        Self {
            signer,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of signing requests answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The key the wallet signs with.
    pub fn signer(&self) -> &EthereumSigner {
        &self.signer
    }
}

#[async_trait]
impl MessageSigner for ScriptedWallet {
    async fn sign_message(&self, message: &[u8]) -> SignerResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.signer.sign_message(message).await
    }
}

/// A wallet that fails every request with a provider error code.
///
/// Code 4001 is the user rejecting the request.
pub struct RejectingWallet {
    pub code: i64,
}

impl RejectingWallet {
    /// A wallet whose user declines every request.
    pub fn declining() -> Self {
        Self { code: 4001 }
    }
}

#[async_trait]
impl MessageSigner for RejectingWallet {
    async fn sign_message(&self, _message: &[u8]) -> SignerResult<String> {
        Err(SignerError::from_provider_code(self.code, "request rejected"))
    }
}
