use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::KeyError;

/// Word counts defined by BIP-39.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Generate a new English BIP-39 mnemonic with `word_count` words.
///
/// 12 words carry 128 bits of entropy, 24 words carry 256.
pub fn generate_mnemonic(word_count: usize) -> Result<String, KeyError> {
    if !VALID_WORD_COUNTS.contains(&word_count) {
        return Err(KeyError::InvalidFormat(format!(
            "mnemonic must have 12, 15, 18, 21 or 24 words, not {word_count}"
        )));
    }

    // 32 bits of entropy per 3 words
    let mut entropy = [0u8; 32];
    let entropy_len = word_count / 3 * 4;
    rand::rngs::OsRng.fill_bytes(&mut entropy[..entropy_len]);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

/// Validate a mnemonic phrase: English wordlist membership, word count and
/// checksum.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}

/// The 64-byte BIP-39 seed that roots every derivation.
///
/// Zeroized on drop.
pub struct RootSeed {
    bytes: [u8; 64],
}

impl RootSeed {
    /// Stretch a mnemonic and optional passphrase into the root seed
    /// (PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" || passphrase`).
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> Result<Self, KeyError> {
        let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;

        Ok(Self {
            bytes: mnemonic.to_seed(passphrase),
        })
    }

    /// Wrap a 64-byte seed obtained elsewhere (e.g. from secure storage).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }
}

impl Drop for RootSeed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
