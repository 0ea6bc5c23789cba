use crate::instrument::Symbol;
use serde::{Deserialize, Serialize};

/// Subset of the [`Binance`](super::Binance) `exchangeInfo` response needed to list symbols.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/general-endpoints#exchange-information>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct BinanceExchangeInfo {
    pub symbols: Vec<BinanceSymbolInfo>,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
}

impl BinanceExchangeInfo {
    /// Symbols currently in `TRADING` status, in listing order.
    pub fn trading_symbols(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .filter(|info| info.status == "TRADING")
            .map(|info| Symbol::new(&info.base_asset, &info.quote_asset))
            .collect()
    }
}
