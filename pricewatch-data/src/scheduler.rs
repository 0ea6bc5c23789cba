use crate::{
    board::{SessionToken, SharedBoard},
    chart::Renderer,
    config::SyncConfig,
    dashboard::Dashboard,
    exchange::DataSource,
    instrument::{Symbol, VenueId},
    timeframe::Timeframe,
};
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

/// Everything a polling task needs to fetch data for the active selection.
#[derive(Debug, Clone)]
pub struct PollContext {
    pub source: Arc<dyn DataSource>,
    pub venue: VenueId,
    pub symbol: Symbol,
    pub timeframe: Timeframe,
}

impl PollContext {
    /// Chart label, eg/ "BTC/USDT 1m".
    pub fn chart_label(&self) -> String {
        format!("{} {}", self.symbol, self.timeframe)
    }
}

/// Running tasks of one active [`PollContext`].
#[derive(Debug)]
struct PollSession {
    context: PollContext,
    price: JoinHandle<()>,
    chart: Option<JoinHandle<()>>,
}

impl PollSession {
    fn abort(self) {
        self.price.abort();
        if let Some(chart) = self.chart {
            chart.abort();
        }
    }
}

/// Owns the periodic work of at most one [`PollSession`].
///
/// The price task refreshes the ticker every `price_interval` and drives the live chart
/// cadence. The chart task loads the historical candle series, retrying after
/// `chart_retry_delay` until it succeeds or is aborted.
///
/// Tasks are spawned on the ambient tokio runtime, so [`start`](Self::start) and
/// [`restart_chart`](Self::restart_chart) must be called from within one.
#[derive(Debug)]
pub struct PollScheduler<D, R> {
    board: SharedBoard<D, R>,
    price_interval: Duration,
    chart_retry_delay: Duration,
    session: Option<PollSession>,
}

impl<D, R> PollScheduler<D, R>
where
    D: Dashboard,
    R: Renderer,
{
    pub fn new(board: SharedBoard<D, R>, config: &SyncConfig) -> Self {
        Self {
            board,
            price_interval: config.price_interval,
            chart_retry_delay: config.chart_retry_delay,
            session: None,
        }
    }

    /// Cancel any running session, then spawn the price and chart tasks for the context.
    pub fn start(&mut self, context: PollContext, token: SessionToken) {
        self.stop();

        info!(
            venue = %context.venue,
            symbol = %context.symbol,
            timeframe = %context.timeframe,
            "starting poll session"
        );

        let price = tokio::spawn(run_price_task(
            Arc::clone(&self.board),
            Arc::clone(&context.source),
            context.symbol.clone(),
            self.price_interval,
            token,
        ));
        let chart = self.spawn_chart(&context, token);

        self.session = Some(PollSession {
            context,
            price,
            chart: Some(chart),
        });
    }

    /// Abort every task of the running session. Stopping an idle scheduler is a no-op.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(symbol = %session.context.symbol, "stopping poll session");
            session.abort();
        }
    }

    /// Abort only the chart task, leaving the price task running.
    pub fn stop_chart(&mut self) {
        if let Some(chart) = self
            .session
            .as_mut()
            .and_then(|session| session.chart.take())
        {
            chart.abort();
        }
    }

    /// Abort and respawn only the chart task, for a new [`Timeframe`].
    ///
    /// Returns `false` if no session is running.
    pub fn restart_chart(&mut self, timeframe: Timeframe, token: SessionToken) -> bool {
        self.stop_chart();

        let Some(mut context) = self.session.as_ref().map(|session| session.context.clone())
        else {
            return false;
        };
        context.timeframe = timeframe;

        info!(symbol = %context.symbol, %timeframe, "restarting chart task");
        let chart = self.spawn_chart(&context, token);

        if let Some(session) = self.session.as_mut() {
            session.context = context;
            session.chart = Some(chart);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn context(&self) -> Option<&PollContext> {
        self.session.as_ref().map(|session| &session.context)
    }

    fn spawn_chart(&self, context: &PollContext, token: SessionToken) -> JoinHandle<()> {
        tokio::spawn(run_chart_task(
            Arc::clone(&self.board),
            context.clone(),
            self.chart_retry_delay,
            token,
        ))
    }
}

impl<D, R> Drop for PollScheduler<D, R> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.abort();
        }
    }
}

async fn run_price_task<D, R>(
    board: SharedBoard<D, R>,
    source: Arc<dyn DataSource>,
    symbol: Symbol,
    period: Duration,
    token: SessionToken,
) where
    D: Dashboard,
    R: Renderer,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let result = source.fetch_ticker(&symbol).await;
        if let Err(error) = &result {
            warn!(venue = %source.venue(), %symbol, %error, "failed to fetch ticker");
        }

        let published = board.lock().publish_ticker(token, result, Instant::now());
        if !published {
            debug!(%symbol, "price task context superseded, exiting");
            return;
        }
    }
}

async fn run_chart_task<D, R>(
    board: SharedBoard<D, R>,
    context: PollContext,
    retry_delay: Duration,
    token: SessionToken,
) where
    D: Dashboard,
    R: Renderer,
{
    let label = context.chart_label();

    loop {
        match context
            .source
            .fetch_candles(&context.symbol, context.timeframe)
            .await
        {
            Ok(series) => {
                let opened = board.lock().open_chart(
                    token,
                    &series,
                    &label,
                    context.timeframe,
                    Instant::now(),
                );

                match opened {
                    Ok(true) => info!(%label, candles = series.len(), "chart opened"),
                    Ok(false) => debug!(%label, "chart task superseded, discarded series"),
                    Err(error) => warn!(%label, %error, "failed to open chart"),
                }
                return;
            }
            Err(error) => {
                warn!(
                    %label,
                    %error,
                    retry_in = ?retry_delay,
                    "failed to load candles, retrying"
                );
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}
