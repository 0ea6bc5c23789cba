use self::{candle::BinanceKline, market::BinanceExchangeInfo, ticker::BinanceTicker24h};
use super::{DataSource, candle_request, finish_series, rest::RestClient};
use crate::{
    config::SyncConfig,
    error::DataError,
    instrument::{Symbol, VenueId},
    market::{Candle, CandleSeries, Ticker},
    timeframe::Timeframe,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Kline (candle) types for [`Binance`].
pub mod candle;

/// Exchange information (symbol listing) types for [`Binance`].
pub mod market;

/// 24h rolling ticker types for [`Binance`].
pub mod ticker;

/// [`Binance`] venue identifier.
pub const BINANCE: &str = "binance";

/// [`Binance`] spot REST base url.
///
/// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/general-api-information>
pub const BASE_URL_BINANCE_SPOT: &str = "https://api.binance.com";

/// Minimum spacing between [`Binance`] requests.
pub const MIN_REQUEST_GAP_BINANCE: Duration = Duration::from_millis(100);

/// Maximum number of klines [`Binance`] returns per request.
pub const MAX_KLINE_LIMIT_BINANCE: usize = 1000;

/// [`Binance`] spot market data over REST.
#[derive(Debug)]
pub struct Binance {
    id: VenueId,
    client: RestClient,
    candle_limit: usize,
}

impl Binance {
    pub fn new(config: &SyncConfig) -> Result<Self, DataError> {
        Self::with_base_url(config, BASE_URL_BINANCE_SPOT)
    }

    pub fn with_base_url(config: &SyncConfig, base_url: &str) -> Result<Self, DataError> {
        let id = VenueId::new(BINANCE);
        Ok(Self {
            client: RestClient::new(
                id.clone(),
                base_url,
                config.request_timeout,
                MIN_REQUEST_GAP_BINANCE,
            )?,
            id,
            candle_limit: config.candle_limit,
        })
    }

    /// [`Binance`] kline interval for a natively supported [`Timeframe`].
    ///
    /// See docs: <https://developers.binance.com/docs/binance-spot-api-docs/rest-api/market-data-endpoints#klinecandlestick-data>
    pub fn interval(timeframe: Timeframe) -> Option<&'static str> {
        match timeframe {
            Timeframe::Minute1 => Some("1m"),
            Timeframe::Hour1 => Some("1h"),
            Timeframe::Day1 => Some("1d"),
            Timeframe::Month1 => Some("1M"),
            Timeframe::Year1 => None,
        }
    }
}

#[async_trait]
impl DataSource for Binance {
    fn venue(&self) -> &VenueId {
        &self.id
    }

    async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let info = self
            .client
            .get::<BinanceExchangeInfo>("/api/v3/exchangeInfo", &[])
            .await?;

        let symbols = info.trading_symbols();
        debug!(venue = %self.id, count = symbols.len(), "loaded symbols");
        Ok(symbols)
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> Result<Ticker, DataError> {
        self.client
            .get::<BinanceTicker24h>("/api/v3/ticker/24hr", &[("symbol", symbol.market(""))])
            .await
            .and_then(Ticker::try_from)
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, DataError> {
        let (request_timeframe, limit) =
            candle_request(timeframe, self.candle_limit, MAX_KLINE_LIMIT_BINANCE);
        let interval = Self::interval(request_timeframe).ok_or_else(|| {
            DataError::unavailable(&self.id, format!("unsupported timeframe {timeframe}"))
        })?;

        let klines = self
            .client
            .get::<Vec<BinanceKline>>(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.market("")),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = klines
            .into_iter()
            .map(Candle::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(finish_series(timeframe, candles))
    }
}
