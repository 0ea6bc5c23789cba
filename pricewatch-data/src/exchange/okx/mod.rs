use self::{candle::OkxCandle, market::OkxInstrument, ticker::OkxTicker};
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

/// Candle types for [`Okx`].
pub mod candle;

/// Instrument (symbol listing) types for [`Okx`].
pub mod market;

/// Ticker types for [`Okx`].
pub mod ticker;

/// [`Okx`] venue identifier.
pub const OKX: &str = "okx";

/// [`Okx`] REST base url.
///
/// See docs: <https://www.okx.com/docs-v5/en/#overview-production-trading-services>
pub const BASE_URL_OKX: &str = "https://www.okx.com";

/// Minimum spacing between [`Okx`] requests.
pub const MIN_REQUEST_GAP_OKX: Duration = Duration::from_millis(100);

/// Maximum number of candles [`Okx`] returns per request.
pub const MAX_CANDLE_LIMIT_OKX: usize = 300;

/// [`Okx`] spot market data over REST.
#[derive(Debug)]
pub struct Okx {
    id: VenueId,
    client: RestClient,
    candle_limit: usize,
}

/// Envelope wrapping every [`Okx`] REST response.
///
/// A non-zero `code` signals an API level failure even when the HTTP status is 200.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> OkxResponse<T> {
    pub fn into_data(self, venue: &VenueId) -> Result<Vec<T>, DataError> {
        if self.code == "0" {
            Ok(self.data)
        } else {
            Err(DataError::unavailable(
                venue,
                format!("api error code {}: {}", self.code, self.msg),
            ))
        }
    }
}

impl Okx {
    pub fn new(config: &SyncConfig) -> Result<Self, DataError> {
        Self::with_base_url(config, BASE_URL_OKX)
    }

    pub fn with_base_url(config: &SyncConfig, base_url: &str) -> Result<Self, DataError> {
        let id = VenueId::new(OKX);
        Ok(Self {
            client: RestClient::new(id.clone(), base_url, config.request_timeout, MIN_REQUEST_GAP_OKX)?,
            id,
            candle_limit: config.candle_limit,
        })
    }

    /// [`Okx`] candle bar for a natively supported [`Timeframe`].
    ///
    /// Daily and monthly bars use the UTC aligned variants.
    ///
    /// See docs: <https://www.okx.com/docs-v5/en/#order-book-trading-market-data-get-candlesticks>
    pub fn bar(timeframe: Timeframe) -> Option<&'static str> {
        match timeframe {
            Timeframe::Minute1 => Some("1m"),
            Timeframe::Hour1 => Some("1H"),
            Timeframe::Day1 => Some("1Dutc"),
            Timeframe::Month1 => Some("1Mutc"),
            Timeframe::Year1 => None,
        }
    }
}

#[async_trait]
impl DataSource for Okx {
    fn venue(&self) -> &VenueId {
        &self.id
    }

    async fn list_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let instruments = self
            .client
            .get::<OkxResponse<OkxInstrument>>(
                "/api/v5/public/instruments",
                &[("instType", "SPOT".to_string())],
            )
            .await?
            .into_data(&self.id)?;

        let symbols = instruments
            .iter()
            .filter_map(OkxInstrument::live_symbol)
            .collect::<Vec<_>>();

        debug!(venue = %self.id, count = symbols.len(), "loaded symbols");
        Ok(symbols)
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> Result<Ticker, DataError> {
        self.client
            .get::<OkxResponse<OkxTicker>>(
                "/api/v5/market/ticker",
                &[("instId", symbol.market("-"))],
            )
            .await?
            .into_data(&self.id)?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::unavailable(&self.id, format!("no ticker for {symbol}")))
            .and_then(Ticker::try_from)
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Result<CandleSeries, DataError> {
        let (request_timeframe, limit) =
            candle_request(timeframe, self.candle_limit, MAX_CANDLE_LIMIT_OKX);
        let bar = Self::bar(request_timeframe).ok_or_else(|| {
            DataError::unavailable(&self.id, format!("unsupported timeframe {timeframe}"))
        })?;

        let candles = self
            .client
            .get::<OkxResponse<OkxCandle>>(
                "/api/v5/market/candles",
                &[
                    ("instId", symbol.market("-")),
                    ("bar", bar.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?
            .into_data(&self.id)?
            .into_iter()
            .map(Candle::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(finish_series(timeframe, candles))
    }
}
