use super::OKX;
use crate::{
    error::DataError, exchange::candle_from_row, instrument::VenueId, market::Candle,
};
use serde::{Deserialize, Serialize};

/// [`Okx`](super::Okx) candle row.
///
/// Rows are arrays of strings `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`,
/// returned newest first.
///
/// See docs: <https://www.okx.com/docs-v5/en/#order-book-trading-market-data-get-candlesticks>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OkxCandle(pub Vec<String>);

impl TryFrom<OkxCandle> for Candle {
    type Error = DataError;

    fn try_from(candle: OkxCandle) -> Result<Self, Self::Error> {
        candle_from_row(&VenueId::new(OKX), &candle.0)
    }
}
