use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The child at this index has no valid key (`IL >= n` or a zero
    /// scalar). Callers must pick a different path; nothing retries.
    #[error("invalid child index {0}: derived key is out of range")]
    InvalidChildIndex(u32),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}
