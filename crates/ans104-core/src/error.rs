//! Error types for the ANS-104 core.

use thiserror::Error;

/// Errors raised while encoding or decoding data items and their fields.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("value {value} does not fit in {width} bytes")]
    EncodingRange { value: String, width: usize },

    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(u16),

    #[error("invalid data item format: {0}")]
    InvalidDataItemFormat(String),

    #[error("data item has no id (it has not been signed)")]
    MissingDataItemId,

    #[error("target must be 32 bytes, got {0}")]
    InvalidTarget(usize),

    #[error("anchor must be 32 bytes, got {0}")]
    InvalidAnchor(usize),

    #[error("invalid tags: {0}")]
    InvalidTags(String),
}

/// Errors raised by signers and the external signing capabilities behind them.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The user rejected the signing request in their wallet.
    ///
    /// Callers should abort quietly instead of surfacing an error.
    #[error("user declined the signing request")]
    UserDeclined,

    #[error("signing provider error: {0}")]
    Provider(String),

    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),

    #[error("public key recovery failed: {0}")]
    KeyRecovery(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// EIP-1193 "user rejected request" provider error code.
pub const USER_REJECTED_CODE: i64 = 4001;

impl SignerError {
    /// Map a wallet provider error code to a signer error.
    pub fn from_provider_code(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            SignerError::UserDeclined
        } else {
            SignerError::Provider(format!("{} (code {})", message.into(), code))
        }
    }

    /// Whether this error is a user rejection rather than a fault.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, SignerError::UserDeclined)
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
