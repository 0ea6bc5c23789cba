use super::BYBIT;
use crate::{
    error::DataError, exchange::candle_from_row, instrument::VenueId, market::Candle,
};
use serde::{Deserialize, Serialize};

/// [`Bybit`](super::Bybit) kline row `[startTime, open, high, low, close, volume, turnover]`,
/// returned newest first.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/market/kline>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BybitKline(pub Vec<String>);

impl TryFrom<BybitKline> for Candle {
    type Error = DataError;

    fn try_from(kline: BybitKline) -> Result<Self, Self::Error> {
        candle_from_row(&VenueId::new(BYBIT), &kline.0)
    }
}
