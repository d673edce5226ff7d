//! BIP-32 derivation paths such as `m/44'/60'/0'/0/0`.

use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

/// Offset added to an index to mark it hardened (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// One step of a derivation path, stored as the raw 32-bit index that goes
/// into `ser32(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex(u32);

impl ChildIndex {
    /// A normal (non-hardened) index. `index` must be below 2^31.
    pub fn normal(index: u32) -> Result<Self, KeyError> {
        if index >= HARDENED_OFFSET {
            return Err(KeyError::InvalidFormat(format!(
                "child index {index} is out of range"
            )));
        }
        Ok(Self(index))
    }

    /// A hardened index. `index` must be below 2^31; the hardened bit is set
    /// here.
    pub fn hardened(index: u32) -> Result<Self, KeyError> {
        Self::normal(index).map(|c| Self(c.0 | HARDENED_OFFSET))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_hardened(self) -> bool {
        self.0 & HARDENED_OFFSET != 0
    }

    /// The index without the hardened bit.
    pub fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildIndex {
    type Err = KeyError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match segment
            .strip_suffix('\'')
            .or_else(|| segment.strip_suffix('h'))
        {
            Some(digits) => (digits, true),
            None => (segment, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::InvalidFormat(format!(
                "invalid path segment {segment:?}"
            )));
        }
        let index: u32 = digits.parse().map_err(|_| {
            KeyError::InvalidFormat(format!("path segment {segment:?} is out of range"))
        })?;

        if hardened {
            Self::hardened(index)
        } else {
            Self::normal(index)
        }
    }
}

/// An ordered list of child indices starting at the master key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    /// The empty path `m`.
    pub fn master() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this path extended by one step.
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(indices: Vec<ChildIndex>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let rest = match path {
            "m" => return Ok(Self::master()),
            _ => path.strip_prefix("m/").ok_or_else(|| {
                KeyError::InvalidFormat(format!("path {path:?} must start with \"m/\""))
            })?,
        };

        rest.split('/')
            .map(ChildIndex::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// BIP-44 path for Ethereum accounts: `m/44'/60'/{account}'/0/{index}`.
///
/// Every EVM network shares this path; the chain id is applied at signing.
pub fn ethereum_path(account: u32, index: u32) -> Result<DerivationPath, KeyError> {
    Ok(DerivationPath(vec![
        ChildIndex::hardened(44)?,
        ChildIndex::hardened(60)?,
        ChildIndex::hardened(account)?,
        ChildIndex::normal(0)?,
        ChildIndex::normal(index)?,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ethereum_path() {
        let path: DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        let raw: Vec<u32> = path.indices().iter().map(|c| c.raw()).collect();
        assert_eq!(raw, vec![0x8000_002c, 0x8000_003c, 0x8000_0000, 0, 0]);
        assert_eq!(path, ethereum_path(0, 0).unwrap());
    }

    #[test]
    fn h_marker_is_hardened() {
        let a: DerivationPath = "m/44h/60h/0h/0/7".parse().unwrap();
        let b: DerivationPath = "m/44'/60'/0'/0/7".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn display_round_trips() {
        let path = ethereum_path(3, 12).unwrap();
        assert_eq!(path.to_string(), "m/44'/60'/3'/0/12");
        assert_eq!(path.to_string().parse::<DerivationPath>().unwrap(), path);
    }

    #[test]
    fn master_path() {
        let path: DerivationPath = "m".parse().unwrap();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "m");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in [
            "",
            "44'/60'",
            "M/44'",
            "m/",
            "m//0",
            "m/44'/60'/",
            "m/abc",
            "m/-1",
            "m/+1",
            "m/1''",
            "m/0x10",
            "m/ 1",
        ] {
            assert!(
                matches!(bad.parse::<DerivationPath>(), Err(KeyError::InvalidFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
        assert!("m/2147483648'".parse::<DerivationPath>().is_err());
        assert!("m/4294967296".parse::<DerivationPath>().is_err());
        assert!("m/2147483647'".parse::<DerivationPath>().is_ok());
        assert!(ethereum_path(HARDENED_OFFSET, 0).is_err());
    }

    #[test]
    fn child_index_accessors() {
        let hardened = ChildIndex::hardened(5).unwrap();
        assert!(hardened.is_hardened());
        assert_eq!(hardened.index(), 5);
        assert_eq!(hardened.raw(), 0x8000_0005);
        assert_eq!(ChildIndex::from_raw(0x8000_0005), hardened);

        let normal = ChildIndex::normal(5).unwrap();
        assert!(!normal.is_hardened());
        assert_eq!(normal.to_string(), "5");
    }

    #[test]
    fn child_extends_path() {
        let account: DerivationPath = "m/44'/60'/0'/0".parse().unwrap();
        let leaf = account.child(ChildIndex::normal(1).unwrap());
        assert_eq!(leaf, ethereum_path(0, 1).unwrap());
        assert_eq!(account.len(), 4);
    }
}
