use crate::instrument::Symbol;
use serde::{Deserialize, Serialize};

/// [`Bybit`](super::Bybit) spot instrument.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/instrument>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitInstrument {
    pub symbol: String,
    pub base_coin: String,
    pub quote_coin: String,
    pub status: String,
}

impl BybitInstrument {
    /// [`Symbol`] for an instrument in `Trading` status.
    pub fn trading_symbol(&self) -> Option<Symbol> {
        (self.status == "Trading").then(|| Symbol::new(&self.base_coin, &self.quote_coin))
    }
}
