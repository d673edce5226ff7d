//! Hierarchical deterministic secp256k1 keys.
//!
//! BIP-39 mnemonics are stretched into a [`RootSeed`], and BIP-32 derives
//! [`ExtendedKey`]s from it along a [`DerivationPath`]. The crate knows
//! nothing about transactions; callers hand the derived private key to a
//! signer.

pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod path;

pub use error::KeyError;
pub use hd_derivation::{derive, generate_private_key, ExtendedKey};
pub use mnemonic::{generate_mnemonic, is_valid_word, validate_mnemonic, RootSeed};
pub use path::{ethereum_path, ChildIndex, DerivationPath};
