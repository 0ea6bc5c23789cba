use crate::{
    config::SyncConfig,
    error::DataError,
    instrument::{Symbol, VenueId},
    market::{Candle, CandleSeries, Ticker},
    timeframe::Timeframe,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::{fmt::Debug, str::FromStr, sync::Arc};

/// [`Binance`](binance::Binance) spot REST venue.
pub mod binance;

/// [`Bybit`](bybit::Bybit) spot REST venue.
pub mod bybit;

/// [`Okx`](okx::Okx) spot REST venue.
pub mod okx;

/// Minimum request spacing owned by each venue.
pub mod rate_limit;

/// Rate limited JSON REST client used by the venue adapters.
pub mod rest;

/// Market-data capability of one venue.
///
/// Every failure is reported as [`DataError::Unavailable`], which callers treat as transient.
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Identifier this venue is registered under.
    fn venue(&self) -> &VenueId;

    /// Tradable symbols listed by the venue, in the venue's order.
    async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError>;

    /// Current 24h ticker snapshot for the symbol.
    async fn fetch_ticker(&self, symbol: &Symbol) -> Result<Ticker, DataError>;

    /// Recent historical candles for the symbol, oldest first.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, DataError>;
}

/// Ordered mapping of [`VenueId`] to the [`DataSource`] serving it.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    sources: IndexMap<VenueId, Arc<dyn DataSource>>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`VenueRegistry`] with every built-in venue: binance, okx, bybit.
    pub fn with_default_venues(config: &SyncConfig) -> Result<Self, DataError> {
        Ok(Self::new()
            .register(binance::Binance::new(config)?)
            .register(okx::Okx::new(config)?)
            .register(bybit::Bybit::new(config)?))
    }

    /// Register a [`DataSource`] under its own [`VenueId`], replacing any previous source.
    pub fn register<Source>(self, source: Source) -> Self
    where
        Source: DataSource + 'static,
    {
        self.register_arc(Arc::new(source))
    }

    pub fn register_arc(mut self, source: Arc<dyn DataSource>) -> Self {
        self.sources.insert(source.venue().clone(), source);
        self
    }

    /// Registered venues in registration order.
    pub fn venues(&self) -> Vec<VenueId> {
        self.sources.keys().cloned().collect()
    }

    /// Lookup the [`DataSource`] for a venue.
    pub fn get(&self, venue: &VenueId) -> Result<Arc<dyn DataSource>, DataError> {
        self.sources
            .get(venue)
            .cloned()
            .ok_or_else(|| DataError::InvalidSelection(format!("unknown venue '{venue}'")))
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Venue request parameters for a [`Timeframe`].
///
/// No built-in venue serves yearly candles, so [`Timeframe::Year1`] requests the venue's
/// maximum number of monthly candles, aggregated afterwards by [`finish_series`].
pub(crate) fn candle_request(timeframe: Timeframe, limit: usize, max_limit: usize) -> (Timeframe, usize) {
    match timeframe {
        Timeframe::Year1 => (Timeframe::Month1, max_limit),
        other => (other, limit.clamp(1, max_limit)),
    }
}

pub(crate) fn finish_series(timeframe: Timeframe, candles: Vec<Candle>) -> CandleSeries {
    let series = CandleSeries::from_unordered(candles);
    match timeframe {
        Timeframe::Year1 => series.aggregate_yearly(),
        _ => series,
    }
}

pub(crate) fn parse_f64(venue: &VenueId, field: &str, raw: &str) -> Result<f64, DataError> {
    raw.parse::<f64>()
        .map_err(|_| DataError::unavailable(venue, format!("invalid {field} '{raw}'")))
}

pub(crate) fn datetime_from_epoch_ms(venue: &VenueId, millis: i64) -> Result<DateTime<Utc>, DataError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DataError::unavailable(venue, format!("invalid timestamp '{millis}'")))
}

/// Derive 24h change and percentage change from the last and 24h open prices.
///
/// Returns `(None, None)` if either price is missing or unparsable, and a `None` percentage
/// if the open price is zero.
pub(crate) fn derive_change(
    last: Option<&str>,
    open: Option<&str>,
) -> (Option<String>, Option<String>) {
    let (Some(last), Some(open)) = (
        last.and_then(|raw| Decimal::from_str(raw).ok()),
        open.and_then(|raw| Decimal::from_str(raw).ok()),
    ) else {
        return (None, None);
    };

    let change = last - open;
    let percentage = (!open.is_zero())
        .then(|| (change / open * Decimal::ONE_HUNDRED).round_dp(8).normalize().to_string());

    (Some(change.normalize().to_string()), percentage)
}

/// Convert a fractional ratio (eg/ "0.0123") into a percentage string (eg/ "1.23").
pub(crate) fn fraction_to_percentage(raw: &str) -> Option<String> {
    Decimal::from_str(raw)
        .ok()
        .map(|fraction| (fraction * Decimal::ONE_HUNDRED).normalize().to_string())
}

/// Parse a `[open_time_ms, open, high, low, close, volume, ...]` row of strings into a
/// [`Candle`].
pub(crate) fn candle_from_row(venue: &VenueId, row: &[String]) -> Result<Candle, DataError> {
    let [open_time, open, high, low, close, volume, ..] = row else {
        return Err(DataError::unavailable(
            venue,
            format!("candle row has {} columns, expected at least 6", row.len()),
        ));
    };

    let open_time = open_time
        .parse::<i64>()
        .map_err(|_| DataError::unavailable(venue, format!("invalid open time '{open_time}'")))?;

    Ok(Candle {
        time: datetime_from_epoch_ms(venue, open_time)?,
        open: parse_f64(venue, "open", open)?,
        high: parse_f64(venue, "high", high)?,
        low: parse_f64(venue, "low", low)?,
        close: parse_f64(venue, "close", close)?,
        volume: parse_f64(venue, "volume", volume)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubSource(VenueId);

    #[async_trait]
    impl DataSource for StubSource {
        fn venue(&self) -> &VenueId {
            &self.0
        }

        async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError> {
            Ok(vec![])
        }

        async fn fetch_ticker(&self, _: &Symbol) -> Result<Ticker, DataError> {
            Err(DataError::unavailable(&self.0, "stub"))
        }

        async fn fetch_candles(&self, _: &Symbol, _: Timeframe) -> Result<CandleSeries, DataError> {
            Ok(CandleSeries::default())
        }
    }

    #[test]
    fn test_venue_registry_preserves_order_and_validates_lookup() {
        let registry = VenueRegistry::new()
            .register(StubSource(VenueId::new("zeta")))
            .register(StubSource(VenueId::new("alpha")));

        assert_eq!(
            registry.venues(),
            vec![VenueId::new("zeta"), VenueId::new("alpha")]
        );
        assert!(registry.get(&VenueId::new("alpha")).is_ok());
        assert!(matches!(
            registry.get(&VenueId::new("missing")),
            Err(DataError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_derive_change() {
        struct TestCase {
            input: (Option<&'static str>, Option<&'static str>),
            expected: (Option<String>, Option<String>),
        }

        let tests = vec![
            TestCase {
                // TC0: rising price
                input: (Some("110"), Some("100")),
                expected: (Some("10".to_string()), Some("10".to_string())),
            },
            TestCase {
                // TC1: falling price
                input: (Some("97.5"), Some("100.0")),
                expected: (Some("-2.5".to_string()), Some("-2.5".to_string())),
            },
            TestCase {
                // TC2: zero open yields no percentage
                input: (Some("1"), Some("0")),
                expected: (Some("1".to_string()), None),
            },
            TestCase {
                // TC3: missing open
                input: (Some("1"), None),
                expected: (None, None),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = derive_change(test.input.0, test.input.1);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_fraction_to_percentage() {
        assert_eq!(fraction_to_percentage("0.0123"), Some("1.23".to_string()));
        assert_eq!(fraction_to_percentage("-0.5"), Some("-50".to_string()));
        assert_eq!(fraction_to_percentage("abc"), None);
    }

    #[test]
    fn test_candle_from_row() {
        let venue = VenueId::new("okx");
        let row = ["1597026383085", "8533.02", "8553.74", "8527.17", "8548.26", "45247", "0"]
            .map(String::from);

        let candle = candle_from_row(&venue, &row).unwrap();
        assert_eq!(candle.time, DateTime::from_timestamp_millis(1597026383085).unwrap());
        assert_eq!(candle.open, 8533.02);
        assert_eq!(candle.close, 8548.26);
        assert_eq!(candle.volume, 45247.0);

        assert!(matches!(
            candle_from_row(&venue, &row[..3]),
            Err(DataError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_candle_request() {
        struct TestCase {
            input: (Timeframe, usize, usize),
            expected: (Timeframe, usize),
        }

        let tests = vec![
            TestCase {
                // TC0: native timeframe keeps the requested limit
                input: (Timeframe::Hour1, 200, 1000),
                expected: (Timeframe::Hour1, 200),
            },
            TestCase {
                // TC1: limit is clamped to the venue maximum
                input: (Timeframe::Minute1, 5000, 300),
                expected: (Timeframe::Minute1, 300),
            },
            TestCase {
                // TC2: yearly requests the maximum monthly history
                input: (Timeframe::Year1, 200, 1000),
                expected: (Timeframe::Month1, 1000),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let (timeframe, limit, max_limit) = test.input;
            let actual = candle_request(timeframe, limit, max_limit);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
