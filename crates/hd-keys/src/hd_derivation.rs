use std::fmt;

use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar, SecretKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, Zeroizing};

use crate::error::KeyError;
use crate::mnemonic::RootSeed;
use crate::path::{ChildIndex, DerivationPath};

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for the BIP-32 master node.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// A BIP-32 extended private key on secp256k1.
///
/// The secret scalar and chain code are wiped on drop.
pub struct ExtendedKey {
    secret: SecretKey,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl ExtendedKey {
    /// Master node: `I = HMAC-SHA512("Bitcoin seed", seed)`, key `IL`,
    /// chain code `IR`.
    pub fn master(seed: &[u8]) -> Result<Self, KeyError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(KeyError::InvalidSeed(format!(
                "seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }

        let i = hmac_sha512(MASTER_HMAC_KEY, &[seed])?;
        let secret = SecretKey::from_slice(&i[..32]).map_err(|_| {
            KeyError::InvalidSeed("master key is zero or exceeds the curve order".into())
        })?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        Ok(Self {
            secret,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
        })
    }

    /// CKDpriv: derive the child at `index`.
    ///
    /// Hardened children hash `0x00 || k_par || ser32(i)`, normal children
    /// hash `serP(K_par) || ser32(i)`. The child key is `IL + k_par mod n`.
    /// When `IL >= n` or the sum is zero the index has no key and
    /// [`KeyError::InvalidChildIndex`] is returned.
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self, KeyError> {
        let raw = index.raw();
        let ser_index = raw.to_be_bytes();

        let i = if index.is_hardened() {
            let parent_key = self.private_key();
            hmac_sha512(&self.chain_code, &[&[0u8], parent_key.as_slice(), &ser_index])?
        } else {
            hmac_sha512(&self.chain_code, &[&self.public_key_compressed(), &ser_index])?
        };

        let il: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(&i[..32])).into();
        let il = il.ok_or(KeyError::InvalidChildIndex(raw))?;
        let child_scalar = il + *self.secret.to_nonzero_scalar();
        let secret = SecretKey::from_bytes(&child_scalar.to_repr())
            .map_err(|_| KeyError::InvalidChildIndex(raw))?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        let depth = self.depth.checked_add(1).ok_or_else(|| {
            KeyError::InvalidFormat("derivation path deeper than 255 levels".into())
        })?;

        Ok(Self {
            secret,
            chain_code,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: raw,
        })
    }

    /// Derive every step of `path` from this key.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, KeyError> {
        match path.indices().split_first() {
            None => Ok(self.duplicate()),
            Some((first, rest)) => derive_along(self.derive_child(*first)?, rest),
        }
    }

    /// The 32-byte big-endian private scalar.
    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes().into())
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    /// SEC1 compressed public key (33 bytes, `0x02`/`0x03` prefix).
    pub fn public_key_compressed(&self) -> [u8; 33] {
        let point = self.secret.public_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// SEC1 uncompressed public key (65 bytes, `0x04` prefix).
    pub fn public_key_uncompressed(&self) -> [u8; 65] {
        let point = self.secret.public_key().to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// First four bytes of `RIPEMD160(SHA256(compressed public key))`.
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = Ripemd160::digest(Sha256::digest(self.public_key_compressed()));
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash[..4]);
        out
    }

    fn duplicate(&self) -> Self {
        Self {
            secret: self.secret.clone(),
            chain_code: self.chain_code,
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
        }
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number)
            .finish_non_exhaustive()
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

fn derive_along(key: ExtendedKey, rest: &[ChildIndex]) -> Result<ExtendedKey, KeyError> {
    match rest.split_first() {
        None => Ok(key),
        Some((next, rest)) => derive_along(key.derive_child(*next)?, rest),
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<Zeroizing<[u8; 64]>, KeyError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| KeyError::InvalidSeed(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Derive the extended key at `path` from a BIP-39 root seed.
pub fn derive(root: &RootSeed, path: &DerivationPath) -> Result<ExtendedKey, KeyError> {
    let key = ExtendedKey::master(root.as_bytes())?.derive_path(path)?;
    tracing::debug!(
        path = %path,
        fingerprint = %hex::encode(key.fingerprint()),
        "derived extended key"
    );
    Ok(key)
}

/// A fresh random secp256k1 private key, for wallets that do not use a
/// mnemonic.
pub fn generate_private_key() -> Zeroizing<[u8; 32]> {
    let secret = SecretKey::random(&mut rand::rngs::OsRng);
    Zeroizing::new(secret.to_bytes().into())
}
