use super::BINANCE;
use crate::{
    error::DataError, exchange::datetime_from_epoch_ms, instrument::VenueId, market::Ticker,
};
use serde::{Deserialize, Serialize};

/// [`Binance`](super::Binance) 24hr rolling window ticker.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/market-data-endpoints#24hr-ticker-price-change-statistics>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24h {
    pub symbol: String,
    #[serde(default)]
    pub price_change: Option<String>,
    #[serde(default)]
    pub price_change_percent: Option<String>,
    #[serde(default)]
    pub last_price: Option<String>,
    #[serde(default)]
    pub low_price: Option<String>,
    pub close_time: i64,
}

impl TryFrom<BinanceTicker24h> for Ticker {
    type Error = DataError;

    fn try_from(ticker: BinanceTicker24h) -> Result<Self, Self::Error> {
        Ok(Ticker {
            time: datetime_from_epoch_ms(&VenueId::new(BINANCE), ticker.close_time)?,
            last: ticker.last_price,
            change: ticker.price_change,
            percentage: ticker.price_change_percent,
            low: ticker.low_price,
        })
    }
}
