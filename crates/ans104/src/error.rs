//! Error types for bundle operations.

use ans104_core::{CodecError, ItemId, SignerError};
use thiserror::Error;

/// Errors that can occur while reading, building or submitting bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The buffer does not describe a well-formed bundle.
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// No item in the bundle carries the requested id.
    #[error("transaction not found: {0}")]
    TransactionNotFound(ItemId),

    /// Item index past the end of the bundle.
    #[error("item index {index} out of range for bundle of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Data item codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Signer error.
    #[error("signer error: {0}")]
    Signer(#[from] SignerError),

    /// The ledger client rejected the transaction.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// I/O error reading a bundle file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundleError {
    /// Whether the user declined a signing request along the way.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, BundleError::Signer(e) if e.is_user_declined())
    }
}

/// Result type for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;
