// src/coins.rs
// Fixed trading-symbol -> coin-code mapping used to route crypto symbols
// to the community news provider. Symbols without an entry are treated as
// equities.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static COIN_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("BTC-USD", "BTC"),
        ("ETH-USD", "ETH"),
        ("BNB-USD", "BNB"),
        ("XRP-USD", "XRP"),
        ("ADA-USD", "ADA"),
        ("SOL-USD", "SOL"),
        ("DOT-USD", "DOT"),
        ("DOGE-USD", "DOGE"),
        ("MATIC-USD", "MATIC"),
        ("AVAX-USD", "AVAX"),
        ("LINK-USD", "LINK"),
        ("UNI-USD", "UNI"),
    ])
});

/// Coin code for a trading symbol, e.g. "BTC-USD" -> "BTC".
pub fn coin_code(symbol: &str) -> Option<&'static str> {
    COIN_CODES.get(symbol.to_ascii_uppercase().as_str()).copied()
}

/// A symbol is crypto when it carries the "-USD" suffix and has a known
/// coin code. An unmapped "-USD" symbol is not crypto.
pub fn is_crypto_symbol(symbol: &str) -> bool {
    symbol.to_ascii_uppercase().ends_with("-USD") && coin_code(symbol).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_map_to_codes() {
        assert_eq!(coin_code("BTC-USD"), Some("BTC"));
        assert_eq!(coin_code("eth-usd"), Some("ETH"));
        assert_eq!(coin_code("AAPL"), None);
    }

    #[test]
    fn unmapped_usd_suffix_is_not_crypto() {
        assert!(is_crypto_symbol("SOL-USD"));
        assert!(!is_crypto_symbol("FOO-USD"));
        assert!(!is_crypto_symbol("MSFT"));
    }
}
