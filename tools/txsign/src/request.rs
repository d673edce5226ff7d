//! JSON transaction requests and the signing report printed back.

use alloy_primitives::U256;
use anyhow::{bail, Context, Result};
use eth_tx::chains::{self, EvmChain};
use eth_tx::{units, Address, Transaction};
use serde::{Deserialize, Serialize};

/// A network named either by EIP-155 chain id or by a well-known name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChainRef {
    Id(u64),
    Name(String),
}

impl ChainRef {
    /// Command-line form: digits are a chain id, anything else a name.
    pub fn from_arg(arg: &str) -> Self {
        match arg.parse::<u64>() {
            Ok(id) => ChainRef::Id(id),
            Err(_) => ChainRef::Name(arg.to_string()),
        }
    }

    /// Chain id plus the known definition, if any. Unknown ids are allowed;
    /// unknown names are not.
    pub fn resolve(&self) -> Result<(u64, Option<&'static EvmChain>)> {
        match self {
            ChainRef::Id(id) => Ok((*id, chains::get_chain(*id))),
            ChainRef::Name(name) => {
                let chain = chains::get_chain_by_name(name)
                    .with_context(|| format!("unknown chain name {name:?}"))?;
                Ok((chain.chain_id, Some(chain)))
            }
        }
    }
}

/// An ERC-20 `transfer` to wrap into a contract call.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenTransfer {
    pub token: Address,
    pub recipient: Address,
    /// Decimal token amount, scaled by `decimals`.
    pub amount: String,
    #[serde(default = "default_token_decimals")]
    pub decimals: u8,
}

fn default_token_decimals() -> u8 {
    18
}

/// A transaction to sign, as read from the request file.
///
/// Amounts are decimal strings: `value` in ether, `gas_price_gwei` in gwei.
/// Gas is never estimated; `gas_limit` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxRequest {
    pub chain: ChainRef,
    pub nonce: u64,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: Option<String>,
    pub gas_price_gwei: String,
    pub gas_limit: u64,
    /// `0x`-prefixed calldata or init code.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub erc20: Option<TokenTransfer>,
}

impl TxRequest {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("malformed transaction request")
    }

    /// Builds the unsigned transaction for `chain_id`.
    pub fn build(&self, chain_id: u64) -> Result<Transaction> {
        let gas_price = units::parse_units(&self.gas_price_gwei, 9).context("gas_price_gwei")?;
        let value = match &self.value {
            Some(value) => units::parse_ether(value).context("value")?,
            None => U256::ZERO,
        };
        let data = match &self.data {
            Some(data) => decode_hex_data(data)?,
            None => Vec::new(),
        };

        if let Some(token) = &self.erc20 {
            if self.to.is_some() || !data.is_empty() || !value.is_zero() {
                bail!("erc20 requests must not also set to, value or data");
            }
            let amount = units::parse_units(&token.amount, token.decimals)
                .context("erc20.amount")?;
            return Ok(Transaction::erc20_transfer(
                chain_id,
                self.nonce,
                token.token,
                token.recipient,
                amount,
                gas_price,
                self.gas_limit,
            ));
        }

        let mut tx = match self.to {
            Some(to) => {
                Transaction::contract_call(chain_id, self.nonce, to, data, gas_price, self.gas_limit)
            }
            None => {
                if data.is_empty() {
                    bail!("a request without `to` deploys a contract and needs init code in `data`");
                }
                Transaction::deployment(chain_id, self.nonce, data, gas_price, self.gas_limit)
            }
        };
        tx.value = value;
        Ok(tx)
    }
}

fn decode_hex_data(text: &str) -> Result<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).context("data is not valid hex")
}

/// What `txsign sign` prints.
#[derive(Debug, Serialize)]
pub struct SignedReport {
    pub chain_id: u64,
    pub chain: Option<&'static str>,
    pub from: Address,
    pub nonce: u64,
    pub raw_transaction: String,
    pub hash: String,
}

/// What `txsign decode` prints.
#[derive(Debug, Serialize)]
pub struct DecodedReport {
    pub signed: bool,
    pub chain_id: u64,
    pub nonce: u64,
    pub to: Option<Address>,
    pub value_ether: String,
    pub gas_price_gwei: String,
    pub gas_limit: u64,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl DecodedReport {
    pub fn new(tx: &Transaction) -> Self {
        Self {
            signed: false,
            chain_id: tx.chain_id,
            nonce: tx.nonce,
            to: tx.to,
            value_ether: units::format_ether(tx.value),
            gas_price_gwei: units::format_units(tx.gas_price, 9),
            gas_limit: tx.gas_limit,
            data: format!("0x{}", hex::encode(&tx.data)),
            from: None,
            hash: None,
        }
    }
}
