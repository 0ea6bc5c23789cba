#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use pricewatch_data::{
    chart::{ChartPoint, RenderHandle, Renderer},
    dashboard::{Dashboard, FieldValue},
    error::DataError,
    exchange::DataSource,
    instrument::{Symbol, VenueId},
    market::{Candle, CandleSeries, PriceField, Ticker},
    timeframe::Timeframe,
};
use std::{collections::HashMap, str::FromStr, time::Duration};
use tokio::time::Instant;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn symbol(input: &str) -> Symbol {
    Symbol::from_str(input).unwrap()
}

/// Wall clock origin of every mock timestamp.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub struct FetchLog {
    /// Start of every ticker fetch, relative to the mock's creation.
    pub tickers: Vec<(Duration, Symbol)>,
    /// Start of every candle fetch, relative to the mock's creation.
    pub candles: Vec<(Duration, Symbol, Timeframe)>,
}

impl FetchLog {
    pub fn ticker_millis(&self) -> Vec<u128> {
        self.tickers
            .iter()
            .map(|(elapsed, _)| elapsed.as_millis())
            .collect()
    }

    pub fn ticker_millis_for(&self, wanted: &Symbol) -> Vec<u128> {
        self.tickers
            .iter()
            .filter(|(_, symbol)| symbol == wanted)
            .map(|(elapsed, _)| elapsed.as_millis())
            .collect()
    }

    pub fn candle_requests(&self) -> Vec<(u128, Timeframe)> {
        self.candles
            .iter()
            .map(|(elapsed, _, timeframe)| (elapsed.as_millis(), *timeframe))
            .collect()
    }
}

/// In-memory [`DataSource`] with deterministic timestamps derived from tokio's (paused) clock.
#[derive(Debug)]
pub struct MockSource {
    venue: VenueId,
    symbols: Option<Vec<Symbol>>,
    started: Instant,
    ticker_delays: HashMap<Symbol, Duration>,
    ticker_fields: HashMap<Symbol, [Option<&'static str>; 4]>,
    failing_tickers: bool,
    candle_failures: Mutex<usize>,
    log: Mutex<FetchLog>,
}

impl MockSource {
    pub fn new(venue: &str, symbols: &[&str]) -> Self {
        Self {
            venue: VenueId::new(venue),
            symbols: Some(symbols.iter().map(|input| symbol(input)).collect()),
            started: Instant::now(),
            ticker_delays: HashMap::new(),
            ticker_fields: HashMap::new(),
            failing_tickers: false,
            candle_failures: Mutex::new(0),
            log: Mutex::new(FetchLog::default()),
        }
    }

    /// Symbol listing always fails.
    pub fn with_unavailable_symbols(mut self) -> Self {
        self.symbols = None;
        self
    }

    pub fn with_ticker_delay(mut self, input: &str, delay: Duration) -> Self {
        self.ticker_delays.insert(symbol(input), delay);
        self
    }

    /// Raw `[last, change, percentage, low]` values returned for the symbol.
    pub fn with_ticker_fields(mut self, input: &str, fields: [Option<&'static str>; 4]) -> Self {
        self.ticker_fields.insert(symbol(input), fields);
        self
    }

    pub fn with_failing_tickers(mut self) -> Self {
        self.failing_tickers = true;
        self
    }

    /// Fail the first `count` candle requests.
    pub fn with_candle_failures(self, count: usize) -> Self {
        *self.candle_failures.lock() = count;
        self
    }

    pub fn log(&self) -> parking_lot::MutexGuard<'_, FetchLog> {
        self.log.lock()
    }

    fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.started)
    }

    fn now(&self) -> DateTime<Utc> {
        base_time() + TimeDelta::from_std(self.elapsed()).unwrap()
    }

    fn default_fields(symbol: &Symbol) -> [Option<&'static str>; 4] {
        match symbol.base.as_str() {
            "ETH" => [Some("2000.987"), Some("-5.5"), Some("-0.27"), Some("1990.1")],
            _ => [Some("42000.129"), Some("120.5"), Some("0.29"), Some("41000")],
        }
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn venue(&self) -> &VenueId {
        &self.venue
    }

    async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        tokio::task::yield_now().await;
        self.symbols
            .clone()
            .ok_or_else(|| DataError::unavailable(&self.venue, "symbols offline"))
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> Result<Ticker, DataError> {
        self.log.lock().tickers.push((self.elapsed(), symbol.clone()));

        if let Some(delay) = self.ticker_delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing_tickers {
            return Err(DataError::unavailable(&self.venue, "ticker offline"));
        }

        let [last, change, percentage, low] = self
            .ticker_fields
            .get(symbol)
            .copied()
            .unwrap_or_else(|| Self::default_fields(symbol));

        Ok(Ticker {
            time: self.now(),
            last: last.map(str::to_string),
            change: change.map(str::to_string),
            percentage: percentage.map(str::to_string),
            low: low.map(str::to_string),
        })
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, DataError> {
        self.log
            .lock()
            .candles
            .push((self.elapsed(), symbol.clone(), timeframe));

        {
            let mut failures = self.candle_failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(DataError::unavailable(&self.venue, "candles offline"));
            }
        }

        let period = TimeDelta::from_std(timeframe.period()).unwrap();
        let candles = (1..=3)
            .rev()
            .map(|periods_ago| Candle {
                time: self.now() - period * periods_ago,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: periods_ago as f64,
                volume: 10.0,
            })
            .collect();

        Ok(CandleSeries::from_unordered(candles))
    }
}

#[derive(Debug, Default)]
pub struct RecordingDashboard {
    pub published: Vec<(PriceField, FieldValue)>,
    pub panel_visible: bool,
    pub venues: Vec<VenueId>,
    pub symbols: Vec<Symbol>,
}

impl RecordingDashboard {
    /// Most recent value published for a field.
    pub fn latest(&self, field: PriceField) -> Option<FieldValue> {
        self.published
            .iter()
            .rev()
            .find(|(published, _)| *published == field)
            .map(|(_, value)| *value)
    }
}

impl Dashboard for RecordingDashboard {
    fn publish_price(&mut self, field: PriceField, value: FieldValue) {
        self.published.push((field, value));
    }

    fn show_info_panel(&mut self) {
        self.panel_visible = true;
    }

    fn hide_info_panel(&mut self) {
        self.panel_visible = false;
    }

    fn populate_venue_options(&mut self, venues: &[VenueId]) {
        self.venues = venues.to_vec();
    }

    fn populate_symbol_options(&mut self, symbols: &[Symbol]) {
        self.symbols = symbols.to_vec();
    }
}

/// [`Renderer`] counting live chart instances.
#[derive(Debug, Default)]
pub struct CountingRenderer {
    next_handle: u64,
    pub live: Vec<RenderHandle>,
    pub max_live: usize,
    pub created: Vec<String>,
    pub appended: Vec<ChartPoint>,
}

impl Renderer for CountingRenderer {
    fn create(&mut self, _: &[ChartPoint], label: &str) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle(self.next_handle);
        self.live.push(handle);
        self.max_live = self.max_live.max(self.live.len());
        self.created.push(label.to_string());
        handle
    }

    fn append_point(&mut self, handle: RenderHandle, point: &ChartPoint) {
        assert!(self.live.contains(&handle), "append to destroyed chart {handle}");
        self.appended.push(point.clone());
    }

    fn destroy(&mut self, handle: RenderHandle) {
        assert!(self.live.contains(&handle), "double destroy of chart {handle}");
        self.live.retain(|live| *live != handle);
    }
}
