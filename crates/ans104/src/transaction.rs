//! Adapter from a bundle to a ledger transaction.
//!
//! The ledger itself is an external collaborator behind [`LedgerClient`]. This
//! module only fills in the payload and the bundle tags.

use ans104_core::Tag;
use async_trait::async_trait;
use bytes::Bytes;

use crate::bundle::Bundle;
use crate::error::{BundleError, Result};

pub const BUNDLE_FORMAT_TAG: &str = "Bundle-Format";
pub const BUNDLE_FORMAT: &str = "binary";
pub const BUNDLE_VERSION_TAG: &str = "Bundle-Version";
pub const BUNDLE_VERSION: &str = "2.0.0";

/// Transaction fields handed to the ledger client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionAttributes {
    /// Transaction payload. Overwritten with the bundle binary.
    pub data: Bytes,
    /// Transaction tags. The bundle tags are appended.
    pub tags: Vec<Tag>,
    pub target: Option<String>,
    pub quantity: Option<String>,
    pub reward: Option<String>,
}

/// A client able to create ledger transactions.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Key material used to create the transaction.
    type Key: Send + Sync;
    /// The ledger's transaction type.
    type Transaction: Send;
    /// Client error.
    type Error: std::error::Error + Send;

    async fn create_transaction(
        &self,
        attributes: TransactionAttributes,
        key: &Self::Key,
    ) -> std::result::Result<Self::Transaction, Self::Error>;
}

impl Bundle {
    /// Wrap this bundle as a ledger transaction payload.
    pub async fn to_transaction<C: LedgerClient>(
        &self,
        mut attributes: TransactionAttributes,
        client: &C,
        key: &C::Key,
    ) -> Result<C::Transaction> {
        attributes.data = self.as_bytes().clone();
        attributes.tags.push(Tag::new(BUNDLE_FORMAT_TAG, BUNDLE_FORMAT));
        attributes.tags.push(Tag::new(BUNDLE_VERSION_TAG, BUNDLE_VERSION));

        client
            .create_transaction(attributes, key)
            .await
            .map_err(|e| BundleError::Ledger(e.to_string()))
    }
}
