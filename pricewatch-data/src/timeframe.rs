use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, time::Duration};

/// Candle granularity.
///
/// Each variant maps to a fixed minute count, used both when requesting candles and as the
/// chart refresh cadence (one new chart point per candle period).
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Deserialize, Serialize,
)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1M")]
    Month1,
    #[serde(rename = "1y")]
    Year1,
}

impl Timeframe {
    /// All timeframes in ascending order.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Minute1,
        Timeframe::Hour1,
        Timeframe::Day1,
        Timeframe::Month1,
        Timeframe::Year1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
            Timeframe::Month1 => "1M",
            Timeframe::Year1 => "1y",
        }
    }

    /// Number of minutes in one candle period.
    pub fn minutes(&self) -> u64 {
        match self {
            Timeframe::Minute1 => 1,
            Timeframe::Hour1 => 60,
            Timeframe::Day1 => 1440,
            Timeframe::Month1 => 43800,
            Timeframe::Year1 => 525600,
        }
    }

    /// Lookup the [`Timeframe`] associated with a minute count.
    pub fn from_minutes(minutes: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|timeframe| timeframe.minutes() == minutes)
    }

    /// Duration of one candle period, which is also the chart refresh cadence.
    pub fn period(&self) -> Duration {
        Duration::from_millis(60_000 * self.minutes())
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DataError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == input)
            .ok_or_else(|| DataError::InvalidSelection(format!("unknown timeframe '{input}'")))
    }
}
