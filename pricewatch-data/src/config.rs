use crate::timeframe::Timeframe;
use std::{str::FromStr, time::Duration};

/// Default cadence of the price refresh task.
pub const DEFAULT_PRICE_INTERVAL: Duration = Duration::from_millis(2000);

/// Default delay before retrying a failed historical candle load.
pub const DEFAULT_CHART_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default number of historical candles requested when a chart opens.
pub const DEFAULT_CANDLE_LIMIT: usize = 200;

/// Default per-request HTTP timeout used by the venue REST clients.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Synchronization engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Interval between price refresh ticks.
    pub price_interval: Duration,
    /// Delay before retrying a failed historical candle load.
    pub chart_retry_delay: Duration,
    /// Number of historical candles requested when a chart opens.
    pub candle_limit: usize,
    /// Per-request HTTP timeout for venue REST clients.
    pub request_timeout: Duration,
    /// Timeframe selected whenever a new venue or symbol becomes active.
    pub default_timeframe: Timeframe,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            price_interval: DEFAULT_PRICE_INTERVAL,
            chart_retry_delay: DEFAULT_CHART_RETRY_DELAY,
            candle_limit: DEFAULT_CANDLE_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            default_timeframe: Timeframe::default(),
        }
    }
}

impl SyncConfig {
    /// Construct a [`SyncConfig`] from `PRICEWATCH_*` environment variables.
    ///
    /// Missing or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|value| *value > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            price_interval: millis("PRICEWATCH_PRICE_INTERVAL_MS", defaults.price_interval),
            chart_retry_delay: millis("PRICEWATCH_CHART_RETRY_MS", defaults.chart_retry_delay),
            candle_limit: lookup("PRICEWATCH_CANDLE_LIMIT")
                .and_then(|value| value.parse().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.candle_limit),
            request_timeout: millis("PRICEWATCH_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            default_timeframe: lookup("PRICEWATCH_TIMEFRAME")
                .and_then(|value| Timeframe::from_str(&value).ok())
                .unwrap_or(defaults.default_timeframe),
        }
    }

    /// Set price refresh interval
    pub fn with_price_interval(mut self, interval: Duration) -> Self {
        self.price_interval = interval;
        self
    }

    /// Set chart retry delay
    pub fn with_chart_retry_delay(mut self, delay: Duration) -> Self {
        self.chart_retry_delay = delay;
        self
    }

    /// Set historical candle limit
    pub fn with_candle_limit(mut self, limit: usize) -> Self {
        self.candle_limit = limit;
        self
    }

    /// Set HTTP request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set default timeframe
    pub fn with_default_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.default_timeframe = timeframe;
        self
    }
}
