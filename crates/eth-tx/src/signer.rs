use alloy_primitives::U256;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::Address;
use crate::codec::{self, EIP155_V_OFFSET};
use crate::error::EthError;
use crate::transaction::{SignedTransaction, Transaction};

/// Half the secp256k1 group order. Signatures with `s` above this are the
/// malleable twin of a canonical one.
const HALF_ORDER: U256 = U256::from_limbs([
    0xdfe9_2f46_681b_20a0,
    0x5d57_6e73_57a4_501d,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);

/// Keccak-256 of the unsigned encoding
/// `[nonce, gas_price, gas_limit, to, value, data, chain_id, 0, 0]`.
pub fn signing_hash(tx: &Transaction) -> [u8; 32] {
    Keccak256::digest(codec::encode_unsigned(tx)).into()
}

/// Signs a transaction with a secp256k1 private key.
///
/// The signing process:
/// 1. Hash the unsigned encoding (see [`signing_hash`]).
/// 2. Sign the hash with RFC 6979 deterministic nonces; k256 returns the
///    low-s form and the matching recovery id.
/// 3. Fold the recovery bit and chain id into
///    `v = recovery_bit + chain_id * 2 + 35`.
pub fn sign(tx: &Transaction, private_key: &[u8; 32]) -> Result<SignedTransaction, EthError> {
    let msg_hash = signing_hash(tx);

    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|_| EthError::SigningError("private key is zero or not below the curve order".into()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(&msg_hash)
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let v = tx
        .chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(EIP155_V_OFFSET + recovery_id.is_y_odd() as u64))
        .ok_or_else(|| {
            EthError::SigningError(format!("chain id {} does not fit in v", tx.chain_id))
        })?;

    let r = U256::from_be_slice(&signature.r().to_bytes());
    let s = U256::from_be_slice(&signature.s().to_bytes());

    tracing::debug!(
        nonce = tx.nonce,
        chain_id = tx.chain_id,
        signing_hash = %hex::encode(msg_hash),
        "signed transaction"
    );

    Ok(SignedTransaction::from_parts(tx.clone(), v, r, s))
}

/// Recovers the sender of a signed transaction.
///
/// The chain id folded into `v` must equal the transaction's own chain id,
/// `r` and `s` must be in range and `s` must be in the low half of the
/// curve order.
pub fn recover_sender(signed: &SignedTransaction) -> Result<Address, EthError> {
    let v = signed.v();
    if v < EIP155_V_OFFSET {
        return Err(EthError::InvalidSignature(format!(
            "v = {v} is not replay protected"
        )));
    }

    let encoded_chain_id = (v - EIP155_V_OFFSET) / 2;
    let recovery_bit = (v - EIP155_V_OFFSET) % 2;

    if encoded_chain_id != signed.chain_id() {
        return Err(EthError::ChainIdMismatch {
            expected: signed.chain_id(),
            found: encoded_chain_id,
        });
    }

    if signed.s() > HALF_ORDER {
        return Err(EthError::InvalidSignature("s is in the upper half of the curve order".into()));
    }

    let signature = Signature::from_scalars(signed.r_bytes(), signed.s_bytes())
        .map_err(|_| EthError::InvalidSignature("r or s is zero or not below the curve order".into()))?;

    let recovery_id = RecoveryId::new(recovery_bit == 1, false);
    let msg_hash = signing_hash(signed.transaction());

    let verifying_key = VerifyingKey::recover_from_prehash(&msg_hash, &signature, recovery_id)
        .map_err(|e| EthError::InvalidSignature(format!("public key recovery failed: {e}")))?;

    let sender = address_of_verifying_key(&verifying_key)?;
    tracing::debug!(nonce = signed.nonce(), %sender, "recovered sender");
    Ok(sender)
}

/// Recovers the sender after checking that the signature is bound to
/// `expected_chain_id`, the network the caller is about to use.
pub fn verify_for_chain(
    signed: &SignedTransaction,
    expected_chain_id: u64,
) -> Result<Address, EthError> {
    if signed.chain_id() != expected_chain_id {
        return Err(EthError::ChainIdMismatch {
            expected: expected_chain_id,
            found: signed.chain_id(),
        });
    }
    recover_sender(signed)
}

/// Address controlled by a private key.
pub fn address_of(private_key: &[u8; 32]) -> Result<Address, EthError> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|_| EthError::SigningError("private key is zero or not below the curve order".into()))?;
    address_of_verifying_key(signing_key.verifying_key())
}

fn address_of_verifying_key(key: &VerifyingKey) -> Result<Address, EthError> {
    let point = key.to_encoded_point(false);
    let uncompressed: [u8; 65] = point
        .as_bytes()
        .try_into()
        .map_err(|_| EthError::InvalidSignature("recovered key is not a curve point".into()))?;
    Address::from_public_key(&uncompressed)
}
