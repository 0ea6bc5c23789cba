use chrono::{DateTime, Datelike, TimeZone, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Price fields published to the dashboard on every price tick.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum PriceField {
    Last,
    Change,
    Percentage,
    Low,
}

impl PriceField {
    pub const ALL: [PriceField; 4] = [
        PriceField::Last,
        PriceField::Change,
        PriceField::Percentage,
        PriceField::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Last => "last",
            PriceField::Change => "change",
            PriceField::Percentage => "percentage",
            PriceField::Low => "low",
        }
    }
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalised 24h ticker snapshot.
///
/// Price fields hold the raw numeric strings sent by the venue, `None` where the venue
/// omitted a value. Formatting happens at publish time so one bad field never blanks the
/// others.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct Ticker {
    pub time: DateTime<Utc>,
    pub last: Option<String>,
    pub change: Option<String>,
    pub percentage: Option<String>,
    pub low: Option<String>,
}

impl Ticker {
    pub fn field(&self, field: PriceField) -> Option<&str> {
        match field {
            PriceField::Last => self.last.as_deref(),
            PriceField::Change => self.change.as_deref(),
            PriceField::Percentage => self.percentage.as_deref(),
            PriceField::Low => self.low.as_deref(),
        }
    }
}

/// Normalised OHLCV candle.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological sequence of [`Candle`]s with unique open times.
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    /// Construct a [`CandleSeries`] from candles in any order.
    ///
    /// Candles sharing an open time are collapsed, keeping the last one received.
    pub fn from_unordered(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|candle| candle.time);

        let mut series: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match series.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => series.push(candle),
            }
        }

        Self(series)
    }

    pub fn candles(&self) -> &[Candle] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.0.last()
    }

    /// Aggregate (monthly) candles into calendar-year candles.
    ///
    /// Used to serve [`Timeframe::Year1`](crate::timeframe::Timeframe::Year1), which no
    /// supported venue offers natively.
    pub fn aggregate_yearly(&self) -> Self {
        let candles: Vec<Candle> = self
            .0
            .iter()
            .chunk_by(|candle| candle.time.year())
            .into_iter()
            .filter_map(|(year, mut group)| {
                let first = group.next()?;
                let open_time = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;

                Some(group.fold(
                    Candle {
                        time: open_time,
                        ..*first
                    },
                    |mut year_candle, candle| {
                        year_candle.high = year_candle.high.max(candle.high);
                        year_candle.low = year_candle.low.min(candle.low);
                        year_candle.close = candle.close;
                        year_candle.volume += candle.volume;
                        year_candle
                    },
                ))
            })
            .collect();

        Self(candles)
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_unordered(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(year: i32, month: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_candle_series_from_unordered_sorts_and_dedups() {
        let series = CandleSeries::from_unordered(vec![
            candle(2024, 3, 3.0, 3.0, 3.0, 3.0),
            candle(2024, 1, 1.0, 1.0, 1.0, 1.0),
            candle(2024, 2, 2.0, 2.0, 2.0, 2.0),
            candle(2024, 3, 3.5, 3.5, 3.5, 3.5),
        ]);

        let closes = series
            .candles()
            .iter()
            .map(|candle| candle.close)
            .collect::<Vec<_>>();

        assert_eq!(closes, vec![1.0, 2.0, 3.5]);
    }

    #[test]
    fn test_candle_series_aggregate_yearly() {
        let series = CandleSeries::from_unordered(vec![
            candle(2023, 11, 10.0, 12.0, 9.0, 11.0),
            candle(2023, 12, 11.0, 15.0, 10.0, 14.0),
            candle(2024, 1, 14.0, 14.5, 8.0, 9.0),
        ]);

        let yearly = series.aggregate_yearly();
        assert_eq!(yearly.len(), 2);

        let y2023 = yearly.candles()[0];
        assert_eq!(y2023.time, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(y2023.open, 10.0);
        assert_eq!(y2023.high, 15.0);
        assert_eq!(y2023.low, 9.0);
        assert_eq!(y2023.close, 14.0);
        assert_eq!(y2023.volume, 2.0);

        let y2024 = yearly.candles()[1];
        assert_eq!(y2024.open, 14.0);
        assert_eq!(y2024.close, 9.0);
    }

    #[test]
    fn test_ticker_field_lookup() {
        let ticker = Ticker {
            time: Utc::now(),
            last: Some("1.5".to_string()),
            change: None,
            percentage: Some("2.0".to_string()),
            low: Some("1.0".to_string()),
        };

        assert_eq!(ticker.field(PriceField::Last), Some("1.5"));
        assert_eq!(ticker.field(PriceField::Change), None);
        assert_eq!(ticker.field(PriceField::Low), Some("1.0"));
    }
}
