//! Legacy EVM transaction core.
//!
//! This crate provides:
//! - 20-byte addresses with EIP-55 checksum formatting
//! - Transaction building for transfers, contract calls and deployments
//! - The canonical RLP wire form (signing and signed) and its strict decoder
//! - EIP-155 replay-protected signing and sender recovery
//! - Minimal static ABI encoding and ERC-20 call helpers
//! - Well-known chain definitions and wei/ether unit conversion
//!
//! Everything here is a pure function of its inputs. Submitting bytes,
//! fetching nonces or estimating gas is left to the caller's network client.

pub mod abi;
pub mod address;
pub mod chains;
pub mod codec;
pub mod erc20;
pub mod error;
pub mod rlp;
pub mod signer;
pub mod transaction;
pub mod units;

pub use address::Address;
pub use alloy_primitives::U256;
pub use codec::DecodedTransaction;
pub use error::EthError;
pub use transaction::{SignedTransaction, Transaction};
