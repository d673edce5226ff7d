//! Well-known EVM networks and their EIP-155 chain ids.

use serde::Serialize;

/// Definition of an EVM-compatible network, as far as signing is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvmChain {
    /// EIP-155 chain id folded into every signature.
    pub chain_id: u64,
    pub name: &'static str,
    /// Native currency ticker.
    pub symbol: &'static str,
    pub decimals: u8,
    pub is_testnet: bool,
    /// Extra lowercase names accepted by [`get_chain_by_name`].
    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

impl EvmChain {
    const fn network(
        chain_id: u64,
        name: &'static str,
        symbol: &'static str,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            chain_id,
            name,
            symbol,
            decimals: 18,
            is_testnet: false,
            aliases,
        }
    }

    const fn testnet(mut self) -> Self {
        self.is_testnet = true;
        self
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

pub const ETHEREUM: EvmChain = EvmChain::network(1, "Ethereum", "ETH", &["mainnet", "eth"]);
pub const OPTIMISM: EvmChain = EvmChain::network(10, "Optimism", "ETH", &["op"]);
pub const BSC: EvmChain = EvmChain::network(56, "BNB Smart Chain", "BNB", &["bsc", "bnb"]);
pub const POLYGON: EvmChain = EvmChain::network(137, "Polygon", "MATIC", &["matic"]);
pub const ARBITRUM: EvmChain = EvmChain::network(42161, "Arbitrum One", "ETH", &["arbitrum", "arb"]);
pub const HOLESKY: EvmChain = EvmChain::network(17000, "Holesky", "ETH", &[]).testnet();
pub const SEPOLIA: EvmChain = EvmChain::network(11155111, "Sepolia", "ETH", &[]).testnet();

const ALL_CHAINS: [&EvmChain; 7] = [
    &ETHEREUM, &OPTIMISM, &BSC, &POLYGON, &ARBITRUM, &HOLESKY, &SEPOLIA,
];

/// Looks a chain up by its EIP-155 id.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS.into_iter().find(|c| c.chain_id == chain_id)
}

/// Looks a chain up by name or alias, ignoring case (`"sepolia"`,
/// `"Ethereum"`, `"mainnet"`).
pub fn get_chain_by_name(name: &str) -> Option<&'static EvmChain> {
    let name = name.trim();
    ALL_CHAINS.into_iter().find(|c| c.answers_to(name))
}

/// Every chain in the table, ordered by chain id.
pub fn supported_chains() -> Vec<&'static EvmChain> {
    let mut chains = ALL_CHAINS.to_vec();
    chains.sort_by_key(|c| c.chain_id);
    chains
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        assert_eq!(get_chain(1), Some(&ETHEREUM));
        assert_eq!(get_chain(11_155_111).map(|c| c.name), Some("Sepolia"));
        assert!(get_chain(999_999).is_none());
    }

    #[test]
    fn lookup_by_name_and_alias() {
        assert_eq!(get_chain_by_name("sepolia").unwrap().chain_id, 11_155_111);
        assert_eq!(get_chain_by_name("MAINNET").unwrap().chain_id, 1);
        assert_eq!(get_chain_by_name(" bnb smart chain ").unwrap().chain_id, 56);
        assert_eq!(get_chain_by_name("arb").unwrap().chain_id, 42161);
        assert!(get_chain_by_name("goerli").is_none());
    }

    #[test]
    fn testnets_are_flagged() {
        let testnets: Vec<u64> = supported_chains()
            .into_iter()
            .filter(|c| c.is_testnet)
            .map(|c| c.chain_id)
            .collect();
        assert_eq!(testnets, vec![17000, 11_155_111]);
    }

    #[test]
    fn ids_and_names_are_unique() {
        let chains = supported_chains();
        for (i, a) in chains.iter().enumerate() {
            for b in &chains[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id, "{} and {}", a.name, b.name);
                assert!(!b.answers_to(a.name), "{} shadows {}", b.name, a.name);
            }
        }
    }

    #[test]
    fn serializes_without_aliases() {
        let json = serde_json::to_value(&POLYGON).unwrap();
        assert_eq!(json["chain_id"], 137);
        assert_eq!(json["symbol"], "MATIC");
        assert!(json.get("aliases").is_none());
    }
}
