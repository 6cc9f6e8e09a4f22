//! Heuristic chain-family detection from an address string
//!
//! Prefix and length checks only, first match wins. No checksum or encoding
//! validation is done, so a label is a hint for the UI and nothing more.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
    /// ETH, BSC and other EVM chains
    EthereumLike,
    BitcoinLike,
    BitcoinTestnet,
    TronLike,
    LitecoinLike,
    DogecoinLike,
    XrpLike,
    SolanaLike,
    Unknown,
}

impl ChainFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainFamily::EthereumLike => "ethereum_like",
            ChainFamily::BitcoinLike => "bitcoin_like",
            ChainFamily::BitcoinTestnet => "bitcoin_testnet",
            ChainFamily::TronLike => "tron_like",
            ChainFamily::LitecoinLike => "litecoin_like",
            ChainFamily::DogecoinLike => "dogecoin_like",
            ChainFamily::XrpLike => "xrp_like",
            ChainFamily::SolanaLike => "solana_like",
            ChainFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the chain family of `raw`
pub fn detect_chain(raw: &str) -> ChainFamily {
    let a = raw.trim();
    let len = a.chars().count();

    if let Some(hex) = a.strip_prefix("0x") {
        if (40..=64).contains(&hex.chars().count()) {
            return ChainFamily::EthereumLike;
        }
    }
    if a.starts_with("bc1") || a.starts_with('1') || a.starts_with('3') {
        return ChainFamily::BitcoinLike;
    }
    if a.starts_with("tb1") {
        return ChainFamily::BitcoinTestnet;
    }
    if a.starts_with('T') && (30..=45).contains(&len) {
        return ChainFamily::TronLike;
    }
    if a.starts_with('L') && (26..=35).contains(&len) {
        return ChainFamily::LitecoinLike;
    }
    if a.starts_with('D') && (26..=35).contains(&len) {
        return ChainFamily::DogecoinLike;
    }
    if a.starts_with('r') && (25..=35).contains(&len) {
        return ChainFamily::XrpLike;
    }
    if (len == 32 || len == 44) && a.chars().all(char::is_alphanumeric) {
        return ChainFamily::SolanaLike;
    }
    ChainFamily::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_chain() {
        let cases = [
            ("0x8589427373D6D84E98730D7795D8f6f8731FDA16", ChainFamily::EthereumLike),
            ("bc1qa5wkgaew2dkv56kfvj49j0av5nml45x9ek9hz6", ChainFamily::BitcoinLike),
            ("1BoatSLRHtKNngkdXEeobR76b53LETtpyT", ChainFamily::BitcoinLike),
            ("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy", ChainFamily::BitcoinLike),
            ("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx", ChainFamily::BitcoinTestnet),
            ("TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE", ChainFamily::TronLike),
            ("LTpYZG19YmfvY2bBDYtCKpunVRw7nVgRHW", ChainFamily::LitecoinLike),
            ("DH5yaieqoZN36fDVciNyRueRGvGLR3mr7L", ChainFamily::DogecoinLike),
            ("rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh", ChainFamily::XrpLike),
            ("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", ChainFamily::SolanaLike),
            ("hello", ChainFamily::Unknown),
        ];
        for (address, expected) in cases {
            assert_eq!(detect_chain(address), expected, "{}", address);
        }
    }

    #[test]
    fn test_short_hex_is_not_ethereum() {
        assert_eq!(detect_chain("0x1234"), ChainFamily::Unknown);
    }

    #[test]
    fn test_detect_chain_trims_input() {
        assert_eq!(detect_chain("  1BoatSLRHtKNngkdXEeobR76b53LETtpyT "), ChainFamily::BitcoinLike);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ChainFamily::SolanaLike.to_string(), "solana_like");
        assert_eq!(
            serde_json::to_value(ChainFamily::BitcoinTestnet).unwrap(),
            serde_json::json!("bitcoin_testnet")
        );
    }
}
