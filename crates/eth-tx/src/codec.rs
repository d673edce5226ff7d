//! Canonical wire form of legacy EIP-155 transactions.
//!
//! Both forms are the RLP list
//! `[nonce, gas_price, gas_limit, to, value, data, v, r, s]`.
//! The unsigned (signing) form carries `chain_id, 0, 0` in the last three
//! slots; the signed form carries the real signature.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::error::EthError;
use crate::rlp::{self, RlpItem};
use crate::transaction::{SignedTransaction, Transaction};

/// Number of fields in both the signing and the signed list.
const FIELD_COUNT: usize = 9;

/// Lowest `v` carrying a replay-protected recovery bit.
pub(crate) const EIP155_V_OFFSET: u64 = 35;

/// Result of decoding a transaction from its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTransaction {
    /// `r` and `s` were both zero; `v` held the chain id.
    Unsigned(Transaction),
    Signed(SignedTransaction),
}

/// Encodes the signing form: the transaction fields followed by
/// `chain_id, 0, 0`.
pub fn encode_unsigned(tx: &Transaction) -> Vec<u8> {
    encode_fields(tx, tx.chain_id, &U256::ZERO, &U256::ZERO)
}

/// Encodes the signed form, ready for broadcast.
pub fn encode_signed(signed: &SignedTransaction) -> Vec<u8> {
    encode_fields(signed.transaction(), signed.v(), &signed.r(), &signed.s())
}

fn encode_fields(tx: &Transaction, v: u64, r: &U256, s: &U256) -> Vec<u8> {
    let mut payload = Vec::with_capacity(64 + tx.data.len());
    rlp::encode_u64(tx.nonce, &mut payload);
    rlp::encode_u256(&tx.gas_price, &mut payload);
    rlp::encode_u64(tx.gas_limit, &mut payload);
    match &tx.to {
        Some(address) => rlp::encode_bytes(address.as_bytes(), &mut payload),
        None => rlp::encode_bytes(&[], &mut payload),
    }
    rlp::encode_u256(&tx.value, &mut payload);
    rlp::encode_bytes(&tx.data, &mut payload);
    rlp::encode_u64(v, &mut payload);
    rlp::encode_u256(r, &mut payload);
    rlp::encode_u256(s, &mut payload);

    let mut out = Vec::with_capacity(payload.len() + 9);
    rlp::encode_list(&payload, &mut out);
    out
}

/// Transaction identifier: Keccak-256 of the signed encoding.
///
/// Distinct from [`crate::signer::signing_hash`], which covers the unsigned
/// form.
pub fn transaction_hash(signed: &SignedTransaction) -> [u8; 32] {
    Keccak256::digest(encode_signed(signed)).into()
}

/// Signed encoding as a `0x`-prefixed hex string, the shape expected by
/// `eth_sendRawTransaction`.
pub fn to_raw_hex(signed: &SignedTransaction) -> String {
    format!("0x{}", hex::encode(encode_signed(signed)))
}

/// Decodes a transaction from its wire bytes.
pub fn decode(bytes: &[u8]) -> Result<DecodedTransaction, EthError> {
    let item = rlp::decode(bytes)?;
    let fields = item.as_list("transaction")?;

    if fields.len() != FIELD_COUNT {
        return Err(EthError::MalformedEncoding(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let nonce = fields[0].as_u64("nonce")?;
    let gas_price = fields[1].as_u256("gas_price")?;
    let gas_limit = fields[2].as_u64("gas_limit")?;
    let to = decode_to(&fields[3])?;
    let value = fields[4].as_u256("value")?;
    let data = fields[5].as_bytes("data")?.to_vec();
    let v = fields[6].as_u64("v")?;
    let r = fields[7].as_u256("r")?;
    let s = fields[8].as_u256("s")?;

    let mut tx = Transaction {
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        data,
        chain_id: v,
    };

    if r.is_zero() && s.is_zero() {
        tracing::trace!(nonce, chain_id = v, "decoded unsigned transaction");
        return Ok(DecodedTransaction::Unsigned(tx));
    }

    if v < EIP155_V_OFFSET {
        return Err(EthError::MalformedEncoding(format!(
            "v = {v} is not replay protected"
        )));
    }
    tx.chain_id = (v - EIP155_V_OFFSET) / 2;

    tracing::trace!(nonce, chain_id = tx.chain_id, "decoded signed transaction");
    Ok(DecodedTransaction::Signed(SignedTransaction::from_parts(tx, v, r, s)))
}

/// Decodes a `0x`-prefixed (or bare) hex string.
pub fn decode_hex(text: &str) -> Result<DecodedTransaction, EthError> {
    let hex_part = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidFormat(format!("invalid hex: {e}")))?;
    decode(&bytes)
}

fn decode_to(item: &RlpItem<'_>) -> Result<Option<Address>, EthError> {
    let bytes = item.as_bytes("to")?;
    match bytes.len() {
        0 => Ok(None),
        20 => {
            let mut addr = [0u8; 20];
            addr.copy_from_slice(bytes);
            Ok(Some(Address::new(addr)))
        }
        n => Err(EthError::MalformedEncoding(format!(
            "to: expected 0 or 20 bytes, found {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Bytes;
    use alloy_rlp::RlpEncodable;

    use super::*;

    /// Field layout mirrored with the reference RLP derive, for cross-checks.
    #[derive(RlpEncodable)]
    struct ReferenceFields {
        nonce: u64,
        gas_price: U256,
        gas_limit: u64,
        to: Bytes,
        value: U256,
        data: Bytes,
        v: u64,
        r: U256,
        s: U256,
    }

    fn eip155_example() -> SignedTransaction {
        // Worked example from EIP-155.
        let tx = Transaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some(Address::new([0x35; 20])),
            value: U256::from(1_000_000_000_000_000_000u128),
            data: Vec::new(),
            chain_id: 1,
        };
        let r = U256::from_str_radix(
            "18515461264373351373200002665853028612451056578545711640558177340181847433846",
            10,
        )
        .unwrap();
        let s = U256::from_str_radix(
            "46948507304638947509940763649030358759909902576025900602547168820602576006531",
            10,
        )
        .unwrap();
        SignedTransaction::from_parts(tx, 37, r, s)
    }

    #[test]
    fn eip155_signing_form() {
        let signed = eip155_example();
        assert_eq!(
            hex::encode(encode_unsigned(signed.transaction())),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn eip155_signed_form() {
        let signed = eip155_example();
        assert_eq!(
            hex::encode(encode_signed(&signed)),
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7640000\
             8025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276\
             a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
    }

    #[test]
    fn encoding_matches_reference_derive() {
        let signed = eip155_example();
        let tx = signed.transaction();
        let reference = ReferenceFields {
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: Bytes::copy_from_slice(tx.to.as_ref().map(|a| a.as_bytes().as_slice()).unwrap_or_default()),
            value: tx.value,
            data: Bytes::copy_from_slice(&tx.data),
            v: signed.v(),
            r: signed.r(),
            s: signed.s(),
        };
        assert_eq!(encode_signed(&signed), alloy_rlp::encode(&reference));
    }

    #[test]
    fn signed_round_trip() {
        let signed = eip155_example();
        let decoded = decode(&encode_signed(&signed)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Signed(signed));
    }

    #[test]
    fn unsigned_round_trip() {
        let tx = Transaction::deployment(
            5,
            0,
            vec![0x60, 0x80, 0x60, 0x40, 0x52],
            U256::from(1_000_000_000u64),
            300_000,
        );
        let decoded = decode(&encode_unsigned(&tx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn contract_creation_encodes_empty_to() {
        let tx = Transaction::deployment(1, 0, vec![0xfe], U256::ZERO, 53_000);
        let encoded = encode_unsigned(&tx);
        // list header, nonce 0x80, gas price 0x80, gas limit 0x82cf08, then `to`.
        assert_eq!(&encoded[1..6], &[0x80, 0x80, 0x82, 0xcf, 0x08]);
        assert_eq!(encoded[6], 0x80);
    }

    #[test]
    fn large_calldata_uses_long_list_header() {
        let tx = Transaction::contract_call(
            1,
            1,
            Address::new([0x11; 20]),
            vec![0xaa; 512],
            U256::from(1u64),
            1_000_000,
        );
        let encoded = encode_unsigned(&tx);
        assert_eq!(encoded[0], 0xf9);
        assert_eq!(decode(&encoded).unwrap(), DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn transaction_hash_covers_signed_form() {
        let signed = eip155_example();
        let expected: [u8; 32] = Keccak256::digest(encode_signed(&signed)).into();
        assert_eq!(transaction_hash(&signed), expected);
        let signing: [u8; 32] = Keccak256::digest(encode_unsigned(signed.transaction())).into();
        assert_ne!(transaction_hash(&signed), signing);
    }

    #[test]
    fn raw_hex_round_trip() {
        let signed = eip155_example();
        let raw = to_raw_hex(&signed);
        assert!(raw.starts_with("0xf86c09"));
        assert_eq!(decode_hex(&raw).unwrap(), DecodedTransaction::Signed(signed));
    }

    #[test]
    fn decode_hex_rejects_garbage() {
        assert!(matches!(decode_hex("0xzz"), Err(EthError::InvalidFormat(_))));
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = encode_signed(&eip155_example());
        bytes.extend_from_slice(&[0x00, 0x00]);
        assert_eq!(decode(&bytes).unwrap_err(), EthError::TrailingBytes(2));
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        // An eight-field list.
        let mut payload = Vec::new();
        for _ in 0..8 {
            rlp::encode_u64(1, &mut payload);
        }
        let mut bytes = Vec::new();
        rlp::encode_list(&payload, &mut bytes);
        assert!(matches!(decode(&bytes), Err(EthError::MalformedEncoding(_))));
    }

    #[test]
    fn decode_rejects_non_list() {
        let mut bytes = Vec::new();
        rlp::encode_bytes(b"not a transaction", &mut bytes);
        assert!(matches!(decode(&bytes), Err(EthError::MalformedEncoding(_))));
    }

    #[test]
    fn decode_rejects_bad_address_width() {
        let mut payload = Vec::new();
        rlp::encode_u64(0, &mut payload);
        rlp::encode_u64(1, &mut payload);
        rlp::encode_u64(21_000, &mut payload);
        rlp::encode_bytes(&[0x11; 19], &mut payload);
        for _ in 0..5 {
            rlp::encode_u64(0, &mut payload);
        }
        let mut bytes = Vec::new();
        rlp::encode_list(&payload, &mut bytes);
        assert!(matches!(decode(&bytes), Err(EthError::MalformedEncoding(_))));
    }

    #[test]
    fn decode_rejects_pre_eip155_signature() {
        let signed = eip155_example();
        let legacy = SignedTransaction::from_parts(
            signed.transaction().clone(),
            27,
            signed.r(),
            signed.s(),
        );
        let bytes = encode_signed(&legacy);
        assert!(matches!(decode(&bytes), Err(EthError::MalformedEncoding(_))));
    }

    #[test]
    fn decode_rejects_nested_field() {
        let mut payload = Vec::new();
        rlp::encode_list(&[], &mut payload);
        for _ in 0..8 {
            rlp::encode_u64(0, &mut payload);
        }
        let mut bytes = Vec::new();
        rlp::encode_list(&payload, &mut bytes);
        assert!(matches!(decode(&bytes), Err(EthError::MalformedEncoding(_))));
    }
}
