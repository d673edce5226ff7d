use thiserror::Error;

/// Errors raised while building, encoding, signing or verifying EVM
/// transactions.
///
/// Every variant is a deterministic input failure. Retrying the same call
/// with the same arguments produces the same error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EthError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("chain id mismatch: expected {expected}, signature encodes {found}")]
    ChainIdMismatch { expected: u64, found: u64 },

    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("value too large: {0}")]
    ValueTooLarge(String),
}
