use alloy_primitives::U256;

use crate::address::Address;
use crate::erc20;

/// An unsigned legacy (EIP-155) transaction.
///
/// Fields are public: a `Transaction` is a plain value the caller assembles
/// before signing. Gas parameters are always supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender-assigned sequence number.
    pub nonce: u64,
    /// Price per unit of gas, in wei.
    pub gas_price: U256,
    pub gas_limit: u64,
    /// Recipient. `None` creates a contract from `data`.
    pub to: Option<Address>,
    /// Amount transferred, in wei.
    pub value: U256,
    /// Calldata or init code (empty for plain transfers).
    pub data: Vec<u8>,
    /// Network the signature is bound to.
    pub chain_id: u64,
}

impl Transaction {
    /// A native-currency transfer.
    pub fn transfer(
        chain_id: u64,
        nonce: u64,
        to: Address,
        value_wei: U256,
        gas_price: U256,
        gas_limit: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to: Some(to),
            value: value_wei,
            data: Vec::new(),
            chain_id,
        }
    }

    /// A call into `contract` with pre-encoded calldata.
    pub fn contract_call(
        chain_id: u64,
        nonce: u64,
        contract: Address,
        calldata: Vec<u8>,
        gas_price: U256,
        gas_limit: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to: Some(contract),
            value: U256::ZERO,
            data: calldata,
            chain_id,
        }
    }

    /// A contract creation carrying `init_code`.
    pub fn deployment(
        chain_id: u64,
        nonce: u64,
        init_code: Vec<u8>,
        gas_price: U256,
        gas_limit: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            to: None,
            value: U256::ZERO,
            data: init_code,
            chain_id,
        }
    }

    /// An ERC-20 `transfer(address,uint256)` sent to `token_contract`.
    pub fn erc20_transfer(
        chain_id: u64,
        nonce: u64,
        token_contract: Address,
        recipient: Address,
        amount: U256,
        gas_price: U256,
        gas_limit: u64,
    ) -> Self {
        let calldata = erc20::encode_transfer(&recipient, amount);
        Self::contract_call(chain_id, nonce, token_contract, calldata, gas_price, gas_limit)
    }

    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// A transaction together with its EIP-155 signature.
///
/// Produced by [`crate::signer::sign`] or by decoding. The signed fields are
/// only reachable by shared reference; [`SignedTransaction::into_unsigned`]
/// is the only way back to a mutable [`Transaction`], and it drops the
/// signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    tx: Transaction,
    v: u64,
    r: U256,
    s: U256,
}

impl SignedTransaction {
    pub(crate) fn from_parts(tx: Transaction, v: u64, r: U256, s: U256) -> Self {
        Self { tx, v, r, s }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Discards the signature. Any change to the returned transaction must be
    /// signed again.
    pub fn into_unsigned(self) -> Transaction {
        self.tx
    }

    pub fn v(&self) -> u64 {
        self.v
    }

    pub fn r(&self) -> U256 {
        self.r
    }

    pub fn s(&self) -> U256 {
        self.s
    }

    /// `r` as a 32-byte big-endian integer.
    pub fn r_bytes(&self) -> [u8; 32] {
        self.r.to_be_bytes()
    }

    /// `s` as a 32-byte big-endian integer.
    pub fn s_bytes(&self) -> [u8; 32] {
        self.s.to_be_bytes()
    }

    pub fn chain_id(&self) -> u64 {
        self.tx.chain_id
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce
    }
}
