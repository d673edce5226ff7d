use alloy_primitives::U256;

use crate::abi::{encode_address_arg, encode_u256_arg, encode_with_selector};
use crate::address::Address;

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Encodes an ERC-20 `transfer(address,uint256)` call.
///
/// Returns the complete calldata (4-byte selector + 64 bytes of arguments).
pub fn encode_transfer(to: &Address, amount: U256) -> Vec<u8> {
    encode_with_selector(
        TRANSFER_SELECTOR,
        &[encode_address_arg(to), encode_u256_arg(&amount)],
    )
}

/// Encodes an ERC-20 `balanceOf(address)` call.
///
/// The result of the call is read back with [`crate::abi::decode_uint256`].
pub fn encode_balance_of(owner: &Address) -> Vec<u8> {
    encode_with_selector(BALANCE_OF_SELECTOR, &[encode_address_arg(owner)])
}

/// Encodes an ERC-20 `approve(address,uint256)` call.
pub fn encode_approve(spender: &Address, amount: U256) -> Vec<u8> {
    encode_with_selector(
        APPROVE_SELECTOR,
        &[encode_address_arg(spender), encode_u256_arg(&amount)],
    )
}
