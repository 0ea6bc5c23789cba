use crate::{
    chart::{ChartManager, ChartPoint, Renderer},
    dashboard::{Dashboard, FieldValue},
    error::DataError,
    market::{CandleSeries, PriceField, Ticker},
    timeframe::Timeframe,
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, warn};

/// [`Board`] shared between the selection state machine and its polling tasks.
pub type SharedBoard<D, R> = Arc<Mutex<Board<D, R>>>;

/// Monotonic counter identifying one selection context.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Generation(pub u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Generation token carried by every polling task.
///
/// The price task is valid while `context` is current, the chart task while both `context`
/// and `chart` are current.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SessionToken {
    pub context: Generation,
    pub chart: Generation,
}

/// Deadline of the next live chart sample.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChartCadence {
    pub timeframe: Timeframe,
    pub period: Duration,
    pub next_due: Instant,
}

impl ChartCadence {
    pub fn new(timeframe: Timeframe, opened_at: Instant) -> Self {
        let period = timeframe.period();
        Self {
            timeframe,
            period,
            next_due: opened_at + period,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Advance the deadline by one period. A deadline left behind by a stall is re-based on
    /// `now` so missed samples are skipped rather than replayed.
    pub fn advance(&mut self, now: Instant) {
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
    }
}

/// Lock protected holder of the [`Dashboard`], the [`ChartManager`], the chart cadence and
/// the current generation tokens.
#[derive(Debug)]
pub struct Board<D, R> {
    dashboard: D,
    chart: ChartManager<R>,
    token: SessionToken,
    cadence: Option<ChartCadence>,
}

impl<D, R> Board<D, R>
where
    D: Dashboard,
    R: Renderer,
{
    pub fn new(dashboard: D, renderer: R) -> Self {
        Self {
            dashboard,
            chart: ChartManager::new(renderer),
            token: SessionToken::default(),
            cadence: None,
        }
    }

    pub fn shared(self) -> SharedBoard<D, R> {
        Arc::new(Mutex::new(self))
    }

    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut D {
        &mut self.dashboard
    }

    pub fn chart(&self) -> &ChartManager<R> {
        &self.chart
    }

    pub fn cadence(&self) -> Option<&ChartCadence> {
        self.cadence.as_ref()
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    /// Tear down everything the previous context displayed: close the chart, hide the info
    /// panel and invalidate every outstanding token.
    pub fn reset(&mut self) -> SessionToken {
        self.chart.close();
        self.cadence = None;
        self.dashboard.hide_info_panel();
        self.token = SessionToken {
            context: self.token.context.next(),
            chart: self.token.chart.next(),
        };
        self.token
    }

    /// Close the chart and invalidate outstanding chart tokens, leaving the price context
    /// untouched.
    pub fn reset_chart(&mut self) -> SessionToken {
        self.chart.close();
        self.cadence = None;
        self.token.chart = self.token.chart.next();
        self.token
    }

    pub fn is_current_context(&self, token: SessionToken) -> bool {
        self.token.context == token.context
    }

    pub fn is_current_chart(&self, token: SessionToken) -> bool {
        self.token == token
    }

    /// Publish the outcome of one price fetch.
    ///
    /// Each [`PriceField`] is published independently so one missing or malformed field never
    /// blanks the others. A failed fetch publishes [`FieldValue::NoData`] for every field.
    /// If the chart cadence is due the last price is also appended to the live chart.
    ///
    /// Returns `false` if the token is stale, in which case nothing is published.
    pub fn publish_ticker(
        &mut self,
        token: SessionToken,
        result: Result<Ticker, DataError>,
        now: Instant,
    ) -> bool {
        if !self.is_current_context(token) {
            debug!(?token, current = ?self.token, "discarded stale ticker");
            return false;
        }

        match result {
            Ok(ticker) => {
                for field in PriceField::ALL {
                    self.dashboard
                        .publish_price(field, FieldValue::from_raw(ticker.field(field)));
                }
                self.dashboard.show_info_panel();
                self.sample_chart(&ticker, now);
            }
            Err(error) => {
                warn!(%error, "price fetch failed, publishing no data");
                for field in PriceField::ALL {
                    self.dashboard.publish_price(field, FieldValue::NoData);
                }
                self.dashboard.show_info_panel();
            }
        }

        true
    }

    /// Open the chart for a loaded [`CandleSeries`] and start the chart cadence.
    ///
    /// Returns `Ok(false)` if the token is stale, in which case the chart is left untouched.
    pub fn open_chart(
        &mut self,
        token: SessionToken,
        series: &CandleSeries,
        label: &str,
        timeframe: Timeframe,
        now: Instant,
    ) -> Result<bool, DataError> {
        if !self.is_current_chart(token) {
            debug!(?token, current = ?self.token, "discarded stale candle series");
            return Ok(false);
        }

        self.chart.open(series, label, timeframe)?;
        self.cadence = Some(ChartCadence::new(timeframe, now));
        Ok(true)
    }

    fn sample_chart(&mut self, ticker: &Ticker, now: Instant) {
        let Some(cadence) = self.cadence.as_mut() else {
            return;
        };
        if !cadence.is_due(now) {
            return;
        }
        cadence.advance(now);

        let value = FieldValue::from_raw(ticker.last.as_deref());
        match value.value() {
            Some(value) => {
                let point = ChartPoint::new(ticker.time, cadence.timeframe, value);
                if self.chart.append(point) {
                    debug!(time = %ticker.time, value, "appended live chart point");
                }
            }
            None => debug!("skipped chart sample without a last price"),
        }
    }
}
