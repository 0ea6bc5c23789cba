use super::BYBIT;
use crate::{
    error::DataError,
    exchange::{datetime_from_epoch_ms, derive_change, fraction_to_percentage},
    instrument::VenueId,
    market::Ticker,
};
use serde::{Deserialize, Serialize};

/// [`Bybit`](super::Bybit) spot ticker.
///
/// `price24hPcnt` is a fraction (eg/ "0.0123" is 1.23%). Change is derived from
/// `prevPrice24h`.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/tickers>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTicker {
    pub symbol: String,
    #[serde(default)]
    pub last_price: Option<String>,
    #[serde(default, rename = "prevPrice24h")]
    pub prev_price_24h: Option<String>,
    #[serde(default, rename = "price24hPcnt")]
    pub price_24h_pcnt: Option<String>,
    #[serde(default, rename = "lowPrice24h")]
    pub low_price_24h: Option<String>,
}

impl BybitTicker {
    /// Normalise into a [`Ticker`] stamped with the response server time.
    pub fn into_ticker(self, time_ms: i64) -> Result<Ticker, DataError> {
        let venue = VenueId::new(BYBIT);
        let (change, derived_percentage) =
            derive_change(self.last_price.as_deref(), self.prev_price_24h.as_deref());
        let percentage = self
            .price_24h_pcnt
            .as_deref()
            .and_then(fraction_to_percentage)
            .or(derived_percentage);

        Ok(Ticker {
            time: datetime_from_epoch_ms(&venue, time_ms)?,
            last: self.last_price,
            change,
            percentage,
            low: self.low_price_24h,
        })
    }
}
