use super::BINANCE;
use crate::{
    error::DataError,
    exchange::{datetime_from_epoch_ms, parse_f64},
    instrument::VenueId,
    market::Candle,
};
use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, SeqAccess, Visitor},
};

/// [`Binance`](super::Binance) kline row.
///
/// Binance encodes each kline as a heterogeneous array:
/// `[open_time, open, high, low, close, volume, close_time, ...]`. Only the leading OHLCV
/// columns are kept, trailing columns are ignored.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/market-data-endpoints#klinecandlestick-data>
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BinanceKline {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl<'de> Deserialize<'de> for BinanceKline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KlineVisitor;

        impl<'de> Visitor<'de> for KlineVisitor {
            type Value = BinanceKline;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a Binance kline array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let missing = |index: usize| serde::de::Error::invalid_length(index, &self);

                let kline = BinanceKline {
                    open_time: seq.next_element()?.ok_or_else(|| missing(0))?,
                    open: seq.next_element()?.ok_or_else(|| missing(1))?,
                    high: seq.next_element()?.ok_or_else(|| missing(2))?,
                    low: seq.next_element()?.ok_or_else(|| missing(3))?,
                    close: seq.next_element()?.ok_or_else(|| missing(4))?,
                    volume: seq.next_element()?.ok_or_else(|| missing(5))?,
                };

                while seq.next_element::<IgnoredAny>()?.is_some() {}

                Ok(kline)
            }
        }

        deserializer.deserialize_seq(KlineVisitor)
    }
}

impl TryFrom<BinanceKline> for Candle {
    type Error = DataError;

    fn try_from(kline: BinanceKline) -> Result<Self, Self::Error> {
        let venue = VenueId::new(BINANCE);
        Ok(Candle {
            time: datetime_from_epoch_ms(&venue, kline.open_time)?,
            open: parse_f64(&venue, "open", &kline.open)?,
            high: parse_f64(&venue, "high", &kline.high)?,
            low: parse_f64(&venue, "low", &kline.low)?,
            close: parse_f64(&venue, "close", &kline.close)?,
            volume: parse_f64(&venue, "volume", &kline.volume)?,
        })
    }
}
