use self::{candle::BybitKline, market::BybitInstrument, ticker::BybitTicker};
use super::{DataSource, candle_request, finish_series, rest::RestClient};
use crate::{
    config::SyncConfig,
    error::DataError,
    instrument::{Symbol, VenueId},
    market::{Candle, CandleSeries, Ticker},
    timeframe::Timeframe,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Kline (candle) types for [`Bybit`].
pub mod candle;

/// Instrument (symbol listing) types for [`Bybit`].
pub mod market;

/// Ticker types for [`Bybit`].
pub mod ticker;

/// [`Bybit`] venue identifier.
pub const BYBIT: &str = "bybit";

/// [`Bybit`] REST base url.
///
/// See docs: <https://bybit-exchange.github.io/docs/v5/guide#authentication>
pub const BASE_URL_BYBIT: &str = "https://api.bybit.com";

/// Minimum spacing between [`Bybit`] requests.
pub const MIN_REQUEST_GAP_BYBIT: Duration = Duration::from_millis(100);

/// Maximum number of klines [`Bybit`] returns per request.
pub const MAX_KLINE_LIMIT_BYBIT: usize = 1000;

/// [`Bybit`] spot market data over REST.
#[derive(Debug)]
pub struct Bybit {
    id: VenueId,
    client: RestClient,
    candle_limit: usize,
}

/// Envelope wrapping every [`Bybit`] v5 REST response.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    pub result: T,
    /// Server time in epoch milliseconds.
    pub time: i64,
}

/// Paginated `result` body of list endpoints.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct BybitList<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

impl<T> BybitResponse<T> {
    /// Reject responses carrying a non-zero `retCode`.
    pub fn check(self, venue: &VenueId) -> Result<Self, DataError> {
        if self.ret_code == 0 {
            Ok(self)
        } else {
            Err(DataError::unavailable(
                venue,
                format!("api error code {}: {}", self.ret_code, self.ret_msg),
            ))
        }
    }
}

impl Bybit {
    pub fn new(config: &SyncConfig) -> Result<Self, DataError> {
        Self::with_base_url(config, BASE_URL_BYBIT)
    }

    pub fn with_base_url(config: &SyncConfig, base_url: &str) -> Result<Self, DataError> {
        let id = VenueId::new(BYBIT);
        Ok(Self {
            client: RestClient::new(
                id.clone(),
                base_url,
                config.request_timeout,
                MIN_REQUEST_GAP_BYBIT,
            )?,
            id,
            candle_limit: config.candle_limit,
        })
    }

    /// [`Bybit`] kline interval for a natively supported [`Timeframe`].
    ///
    /// See docs: <https://bybit-exchange.github.io/docs/v5/market/kline>
    pub fn interval(timeframe: Timeframe) -> Option<&'static str> {
        match timeframe {
            Timeframe::Minute1 => Some("1"),
            Timeframe::Hour1 => Some("60"),
            Timeframe::Day1 => Some("D"),
            Timeframe::Month1 => Some("M"),
            Timeframe::Year1 => None,
        }
    }
}

#[async_trait]
impl DataSource for Bybit {
    fn venue(&self) -> &VenueId {
        &self.id
    }

    async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let response = self
            .client
            .get::<BybitResponse<BybitList<BybitInstrument>>>(
                "/v5/market/instruments-info",
                &[("category", "spot".to_string())],
            )
            .await?
            .check(&self.id)?;

        let symbols = response
            .result
            .list
            .iter()
            .filter_map(BybitInstrument::trading_symbol)
            .collect::<Vec<_>>();

        debug!(venue = %self.id, count = symbols.len(), "loaded symbols");
        Ok(symbols)
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> Result<Ticker, DataError> {
        let response = self
            .client
            .get::<BybitResponse<BybitList<BybitTicker>>>(
                "/v5/market/tickers",
                &[
                    ("category", "spot".to_string()),
                    ("symbol", symbol.market("")),
                ],
            )
            .await?
            .check(&self.id)?;

        let time = response.time;
        response
            .result
            .list
            .into_iter()
            .next()
            .ok_or_else(|| DataError::unavailable(&self.id, format!("no ticker for {symbol}")))
            .and_then(|ticker| ticker.into_ticker(time))
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, DataError> {
        let (request_timeframe, limit) =
            candle_request(timeframe, self.candle_limit, MAX_KLINE_LIMIT_BYBIT);
        let interval = Self::interval(request_timeframe).ok_or_else(|| {
            DataError::unavailable(&self.id, format!("unsupported timeframe {timeframe}"))
        })?;

        let candles = self
            .client
            .get::<BybitResponse<BybitList<BybitKline>>>(
                "/v5/market/kline",
                &[
                    ("category", "spot".to_string()),
                    ("symbol", symbol.market("")),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?
            .check(&self.id)?
            .result
            .list
            .into_iter()
            .map(Candle::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(finish_series(timeframe, candles))
    }
}
