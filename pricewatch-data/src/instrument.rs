use crate::error::DataError;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, StrExt};
use std::str::FromStr;

/// Unique identifier of a venue (exchange) registered with a
/// [`VenueRegistry`](crate::exchange::VenueRegistry), eg/ "binance".
#[derive(
    Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Deserialize, Serialize,
)]
pub struct VenueId(pub SmolStr);

impl VenueId {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self(id.as_ref().to_lowercase_smolstr())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for VenueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Tradable pair scoped to the venue it was listed by, displayed as `BASE/QUOTE`.
///
/// Each venue translates a [`Symbol`] into its own market identifier (eg/ "BTCUSDT",
/// "BTC-USDT").
#[derive(
    Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, Deserialize, Serialize,
)]
#[display("{base}/{quote}")]
pub struct Symbol {
    pub base: SmolStr,
    pub quote: SmolStr,
}

impl Symbol {
    pub fn new<S: AsRef<str>>(base: S, quote: S) -> Self {
        Self {
            base: base.as_ref().to_uppercase_smolstr(),
            quote: quote.as_ref().to_uppercase_smolstr(),
        }
    }

    /// Market identifier formed by joining base and quote with the provided delimiter.
    pub fn market(&self, delimiter: &str) -> String {
        format!("{}{delimiter}{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = DataError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(base.trim(), quote.trim()))
            }
            _ => Err(DataError::InvalidSelection(format!(
                "symbol '{input}' is not of the form BASE/QUOTE"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_from_str() {
        struct TestCase {
            input: &'static str,
            expected: Result<Symbol, DataError>,
        }

        let tests = vec![
            TestCase {
                // TC0: valid pair
                input: "BTC/USDT",
                expected: Ok(Symbol::new("BTC", "USDT")),
            },
            TestCase {
                // TC1: lowercase pair is normalised
                input: "eth/usd",
                expected: Ok(Symbol::new("ETH", "USD")),
            },
            TestCase {
                // TC2: missing delimiter
                input: "BTCUSDT",
                expected: Err(DataError::InvalidSelection(String::new())),
            },
            TestCase {
                // TC3: empty quote
                input: "BTC/",
                expected: Err(DataError::InvalidSelection(String::new())),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = Symbol::from_str(test.input);
            match (actual, test.expected) {
                (Ok(actual), Ok(expected)) => assert_eq!(actual, expected, "TC{} failed", index),
                (Err(_), Err(_)) => {
                    // Test passed
                }
                (actual, expected) => {
                    // Test failed
                    panic!(
                        "TC{index} failed because actual != expected. \nActual: {actual:?}\nExpected: {expected:?}\n"
                    );
                }
            }
        }
    }

    #[test]
    fn test_symbol_display_and_market() {
        let symbol = Symbol::new("btc", "usdt");
        assert_eq!(symbol.to_string(), "BTC/USDT");
        assert_eq!(symbol.market(""), "BTCUSDT");
        assert_eq!(symbol.market("-"), "BTC-USDT");
    }

    #[test]
    fn test_venue_id_is_lowercase() {
        assert_eq!(VenueId::new("Binance").as_str(), "binance");
        assert_eq!(VenueId::from("OKX"), VenueId::new("okx"));
    }
}
