//! Minimal ABI encoding for EVM function calls.
//!
//! Covers the static head of a call: a 4-byte selector followed by 32-byte
//! words. Dynamic types (strings, bytes, arrays) are not supported.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::EthError;
use crate::rlp::trim_leading_zeros;

/// One 32-byte ABI word.
pub type Word = [u8; 32];

/// A static ABI argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer.
    Uint256(U256),
    /// A boolean, encoded as 0 or 1.
    Bool(bool),
    /// A `bytes32` value, stored as-is.
    FixedBytes32([u8; 32]),
}

impl AbiParam {
    /// Encodes the argument as a single 32-byte word.
    pub fn to_word(&self) -> Word {
        match self {
            AbiParam::Address(address) => encode_address_arg(address),
            AbiParam::Uint256(value) => encode_u256_arg(value),
            AbiParam::Bool(flag) => {
                let mut word = [0u8; 32];
                word[31] = *flag as u8;
                word
            }
            AbiParam::FixedBytes32(bytes) => *bytes,
        }
    }
}

/// First 4 bytes of the Keccak-256 hash of a canonical function signature
/// such as `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Left-pads an address with 12 zero bytes.
pub fn encode_address_arg(address: &Address) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Left-pads a big-endian unsigned integer of any width to 32 bytes.
///
/// Leading zero bytes are ignored; more than 32 significant bytes yield
/// [`EthError::ValueTooLarge`].
pub fn encode_uint_arg(big_endian: &[u8]) -> Result<Word, EthError> {
    let significant = trim_leading_zeros(big_endian);
    if significant.len() > 32 {
        return Err(EthError::ValueTooLarge(format!(
            "uint256 argument needs {} bytes",
            significant.len()
        )));
    }

    let mut word = [0u8; 32];
    word[32 - significant.len()..].copy_from_slice(significant);
    Ok(word)
}

/// Encodes a `uint256` that is already known to fit.
pub fn encode_u256_arg(value: &U256) -> Word {
    value.to_be_bytes()
}

/// `selector(signature) || args[0] || args[1] || ...`
pub fn encode_call(signature: &str, args: &[Word]) -> Vec<u8> {
    encode_with_selector(selector(signature), args)
}

/// Like [`encode_call`] with a precomputed selector.
pub fn encode_with_selector(selector: [u8; 4], args: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * 32);
    data.extend_from_slice(&selector);
    for word in args {
        data.extend_from_slice(word);
    }
    data
}

/// Encodes a call from typed arguments.
pub fn encode_function_call(signature: &str, params: &[AbiParam]) -> Vec<u8> {
    let words: Vec<Word> = params.iter().map(AbiParam::to_word).collect();
    encode_call(signature, &words)
}

/// Decodes a single `uint256` return value.
///
/// Useful for `balanceOf` and similar view functions. Extra words after the
/// first are ignored.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    let word = data.get(..32).ok_or_else(|| {
        EthError::MalformedEncoding(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        ))
    })?;
    Ok(U256::from_be_slice(word))
}
