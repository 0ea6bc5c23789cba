use crate::{
    error::DataError,
    format::format_timestamp,
    market::{Candle, CandleSeries},
    timeframe::Timeframe,
};
use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque identifier of one renderer instance, issued by [`Renderer::create`].
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, From, Deserialize, Serialize,
)]
pub struct RenderHandle(pub u64);

/// One chart sample: x-axis label and y-axis value.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct ChartPoint {
    pub time: DateTime<Utc>,
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(time: DateTime<Utc>, timeframe: Timeframe, value: f64) -> Self {
        Self {
            time,
            label: format_timestamp(time, timeframe),
            value,
        }
    }

    /// Chart point plotting the close price of a [`Candle`].
    pub fn from_candle(candle: &Candle, timeframe: Timeframe) -> Self {
        Self::new(candle.time, timeframe, candle.close)
    }
}

/// Drawing surface able to host a line chart.
pub trait Renderer: Send + 'static {
    /// Create a chart instance seeded with the provided points.
    fn create(&mut self, points: &[ChartPoint], label: &str) -> RenderHandle;

    /// Append one point to a live chart instance and redraw it.
    fn append_point(&mut self, handle: RenderHandle, point: &ChartPoint);

    /// Destroy a chart instance. The handle is never used again afterwards.
    fn destroy(&mut self, handle: RenderHandle);
}

/// Live chart: one renderer handle and the points it is displaying.
#[derive(Clone, PartialEq, Debug)]
pub struct ChartSession {
    pub handle: RenderHandle,
    pub label: String,
    pub timeframe: Timeframe,
    pub points: Vec<ChartPoint>,
}

impl ChartSession {
    pub fn last_point(&self) -> Option<&ChartPoint> {
        self.points.last()
    }
}

/// Owns the lifecycle of at most one [`ChartSession`] drawn by a [`Renderer`].
#[derive(Debug)]
pub struct ChartManager<R> {
    renderer: R,
    session: Option<ChartSession>,
}

impl<R> ChartManager<R>
where
    R: Renderer,
{
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            session: None,
        }
    }

    /// Open a [`ChartSession`] plotting the close of every candle in the series.
    ///
    /// Fails with [`DataError::ChartAlreadyOpen`] if a session is live, callers must
    /// [`close`](Self::close) first.
    pub fn open(
        &mut self,
        series: &CandleSeries,
        label: impl Into<String>,
        timeframe: Timeframe,
    ) -> Result<&ChartSession, DataError> {
        if self.session.is_some() {
            return Err(DataError::ChartAlreadyOpen);
        }

        let label = label.into();
        let points = series
            .candles()
            .iter()
            .map(|candle| ChartPoint::from_candle(candle, timeframe))
            .collect::<Vec<_>>();

        let handle = self.renderer.create(&points, &label);
        debug!(%handle, %label, points = points.len(), "opened chart session");

        Ok(&*self.session.insert(ChartSession {
            handle,
            label,
            timeframe,
            points,
        }))
    }

    /// Append a point to the live session.
    ///
    /// Returns `false` without touching the renderer if no session is live or the point is not
    /// strictly newer than the last point.
    pub fn append(&mut self, point: ChartPoint) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if session
            .last_point()
            .is_some_and(|last| point.time <= last.time)
        {
            debug!(handle = %session.handle, time = %point.time, "dropped non-increasing chart point");
            return false;
        }

        self.renderer.append_point(session.handle, &point);
        session.points.push(point);
        true
    }

    /// Destroy the live session, if any.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            self.renderer.destroy(session.handle);
            debug!(handle = %session.handle, label = %session.label, "closed chart session");
        }
    }

    pub fn session(&self) -> Option<&ChartSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
