use std::fmt;
use std::str::FromStr;

use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, PublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A 20-byte EVM account identifier.
///
/// Equality and hashing are by raw bytes. Letter case in the text form is
/// only a display concern (EIP-55) and never affects equality.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn into_array(self) -> [u8; 20] {
        self.0
    }

    /// Parses `0x` + 40 hex characters (the prefix is optional, case is
    /// ignored).
    pub fn parse(text: &str) -> Result<Self, EthError> {
        let hex_part = strip_hex_prefix(text);

        if hex_part.len() != 40 {
            return Err(EthError::InvalidFormat(format!(
                "expected 40 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_part, &mut bytes).map_err(|_| {
            EthError::InvalidFormat("address contains non-hex characters".into())
        })?;

        Ok(Self(bytes))
    }

    /// Formats the address as `0x` + 40 hex characters, optionally with the
    /// EIP-55 mixed-case checksum applied.
    pub fn format(&self, checksummed: bool) -> String {
        if checksummed {
            self.to_checksum()
        } else {
            format!("0x{}", hex::encode(self.0))
        }
    }

    /// EIP-55 checksum encoding.
    ///
    /// The Keccak-256 hash of the lowercase hex digits decides the case of
    /// each letter: hex digit `i` is uppercased iff nibble `i` of the hash is
    /// at least 8.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut checksummed = String::with_capacity(42);
        checksummed.push_str("0x");

        for (i, c) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                checksummed.push(c.to_ascii_uppercase());
            } else {
                checksummed.push(c);
            }
        }

        checksummed
    }

    /// Derives the address of an uncompressed secp256k1 public key (65 bytes,
    /// starting with 0x04).
    ///
    /// The address is the last 20 bytes of the Keccak-256 hash of the 64-byte
    /// key without its prefix.
    pub fn from_public_key(uncompressed_pubkey: &[u8; 65]) -> Result<Self, EthError> {
        if uncompressed_pubkey[0] != 0x04 {
            return Err(EthError::InvalidFormat(
                "uncompressed key must start with 0x04".into(),
            ));
        }

        let hash = Keccak256::digest(&uncompressed_pubkey[1..]);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Ok(Self(bytes))
    }

    /// Derives the address of a compressed secp256k1 public key (33 bytes).
    pub fn from_compressed_public_key(pubkey_33_bytes: &[u8; 33]) -> Result<Self, EthError> {
        let encoded = EncodedPoint::from_bytes(pubkey_33_bytes).map_err(|e| {
            EthError::InvalidFormat(format!("invalid compressed key encoding: {e}"))
        })?;

        let pubkey: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();
        let pubkey = pubkey.ok_or_else(|| {
            EthError::InvalidFormat("point is not on the secp256k1 curve".into())
        })?;

        let uncompressed = pubkey.to_encoded_point(false);

        let key_65: [u8; 65] = uncompressed.as_bytes().try_into().map_err(|_| {
            EthError::InvalidFormat("unexpected uncompressed key length".into())
        })?;

        Self::from_public_key(&key_65)
    }
}

/// Whether an account holds code, given the bytecode length reported by the
/// network.
pub fn is_contract(bytecode_len: usize) -> bool {
    bytecode_len > 0
}

/// Validates an address string, including its EIP-55 checksum when the
/// letters are mixed case.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted.
/// Returns `Ok(false)` for a well-formed address whose casing does not match.
pub fn has_valid_checksum(text: &str) -> Result<bool, EthError> {
    let address = Address::parse(text)?;
    let hex_part = strip_hex_prefix(text);

    let is_all_lower = !hex_part.chars().any(|c| c.is_ascii_uppercase());
    let is_all_upper = !hex_part.chars().any(|c| c.is_ascii_lowercase());

    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(address.to_checksum()[2..] == *hex_part)
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

impl FromStr for Address {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Address::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x52908400098527886E0F7030069857D2E4169EE7",
            "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
            "0xde709f2102306220921060314715629080e2fb77",
            "0x27b1fdb04752bbc536007a920d24acb045561c26",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let address = Address::parse(&expected.to_lowercase()).unwrap();
            assert_eq!(
                address.format(true),
                *expected,
                "checksum mismatch for {}",
                expected
            );
        }
    }

    #[test]
    fn format_lowercase_round_trips() {
        let text = "0x52908400098527886e0f7030069857d2e4169ee7";
        let address = Address::parse(text).unwrap();
        assert_eq!(address.format(false), text);
        assert_eq!(
            address.format(true),
            "0x52908400098527886E0F7030069857D2E4169EE7"
        );
    }

    #[test]
    fn parse_without_prefix() {
        let with = Address::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let without = Address::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn equality_ignores_case() {
        let upper = Address::parse("0X5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        let lower = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn parse_short_address_errors() {
        let err = Address::parse("0x5aAeb6053F").unwrap_err();
        assert!(matches!(err, EthError::InvalidFormat(_)));
    }

    #[test]
    fn parse_long_address_errors() {
        let err = Address::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00").unwrap_err();
        assert!(matches!(err, EthError::InvalidFormat(_)));
    }

    #[test]
    fn parse_non_hex_errors() {
        let err = Address::parse("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap_err();
        assert!(matches!(err, EthError::InvalidFormat(_)));
    }

    #[test]
    fn parse_empty_is_not_zero_address() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("0x").is_err());
    }

    #[test]
    fn checksum_validation() {
        assert!(has_valid_checksum("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap());
        assert!(has_valid_checksum("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap());
        assert!(has_valid_checksum("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap());
        // Wrong case on a single letter breaks the checksum.
        assert!(!has_valid_checksum("0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap());
        assert!(has_valid_checksum("0xdead").is_err());
    }

    #[test]
    fn is_contract_predicate() {
        assert!(!is_contract(0));
        assert!(is_contract(1));
        assert!(is_contract(24_576));
    }

    #[test]
    fn pubkey_to_address_known_vector() {
        // Private key 0x00..01.
        use k256::SecretKey;

        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let secret = SecretKey::from_bytes((&privkey).into()).expect("valid private key");
        let uncompressed = secret.public_key().to_encoded_point(false);

        let mut key_65 = [0u8; 65];
        key_65.copy_from_slice(uncompressed.as_bytes());

        let address = Address::from_public_key(&key_65).unwrap();
        assert_eq!(
            address.to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn compressed_pubkey_to_address() {
        use k256::SecretKey;

        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let secret = SecretKey::from_bytes((&privkey).into()).expect("valid private key");
        let compressed = secret.public_key().to_encoded_point(true);

        let mut key_33 = [0u8; 33];
        key_33.copy_from_slice(compressed.as_bytes());

        let address = Address::from_compressed_public_key(&key_33).unwrap();
        assert_eq!(
            address.to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn invalid_uncompressed_prefix_errors() {
        let mut key = [0u8; 65];
        key[0] = 0x03;
        assert!(Address::from_public_key(&key).is_err());
    }

    #[test]
    fn serde_uses_checksummed_string() {
        let address = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\"");

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);

        assert!(serde_json::from_str::<Address>("\"0x1234\"").is_err());
    }

    #[test]
    fn lower_hex_formatting() {
        let address = Address::new([0xab; 20]);
        assert_eq!(format!("{:x}", address), "ab".repeat(20));
        assert_eq!(format!("{:#x}", address), format!("0x{}", "ab".repeat(20)));
    }
}
