use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pricewatch_data::{
    chart::{ChartPoint, RenderHandle, Renderer},
    dashboard::{Dashboard, FieldValue},
    instrument::{Symbol, VenueId},
    market::PriceField,
    selection::SelectionState,
};
use std::{collections::BTreeMap, sync::Arc};

pub type SharedView = Arc<Mutex<ViewState>>;

/// Chart currently drawn by the terminal.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub handle: RenderHandle,
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// Everything the terminal draws, written by the engine and read by the render loop.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub venues: Vec<VenueId>,
    pub symbols: Vec<Symbol>,
    pub symbol_cursor: usize,
    pub prices: BTreeMap<PriceField, FieldValue>,
    pub panel_visible: bool,
    pub chart: Option<ChartView>,
    pub selection: SelectionState,
    pub last_error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    next_handle: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            venues: Vec::new(),
            symbols: Vec::new(),
            symbol_cursor: 0,
            prices: BTreeMap::new(),
            panel_visible: false,
            chart: None,
            selection: SelectionState::Uninitialized,
            last_error: None,
            last_update: None,
            next_handle: 0,
        }
    }
}

impl ViewState {
    pub fn shared() -> SharedView {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.symbols.is_empty() {
            return;
        }
        let len = self.symbols.len() as isize;
        self.symbol_cursor = (self.symbol_cursor as isize + delta).rem_euclid(len) as usize;
    }

    pub fn cursor_symbol(&self) -> Option<&Symbol> {
        self.symbols.get(self.symbol_cursor)
    }

    /// Venue `offset` positions away from the selected venue, wrapping around.
    pub fn venue_at_offset(&self, offset: isize) -> Option<VenueId> {
        if self.venues.is_empty() {
            return None;
        }
        let current = self
            .selection
            .venue()
            .and_then(|venue| self.venues.iter().position(|known| known == venue))
            .unwrap_or(0) as isize;
        let len = self.venues.len() as isize;
        self.venues
            .get((current + offset).rem_euclid(len) as usize)
            .cloned()
    }
}

/// [`Dashboard`] writing into the shared [`ViewState`].
#[derive(Debug, Clone)]
pub struct TuiDashboard(pub SharedView);

impl Dashboard for TuiDashboard {
    fn publish_price(&mut self, field: PriceField, value: FieldValue) {
        let mut view = self.0.lock();
        view.prices.insert(field, value);
        view.last_update = Some(Utc::now());
    }

    fn show_info_panel(&mut self) {
        self.0.lock().panel_visible = true;
    }

    fn hide_info_panel(&mut self) {
        let mut view = self.0.lock();
        view.panel_visible = false;
        view.prices.clear();
    }

    fn populate_venue_options(&mut self, venues: &[VenueId]) {
        self.0.lock().venues = venues.to_vec();
    }

    fn populate_symbol_options(&mut self, symbols: &[Symbol]) {
        let mut view = self.0.lock();
        view.symbols = symbols.to_vec();
        view.symbol_cursor = 0;
    }
}

/// [`Renderer`] keeping the single drawn chart in the shared [`ViewState`].
#[derive(Debug, Clone)]
pub struct TuiRenderer(pub SharedView);

impl Renderer for TuiRenderer {
    fn create(&mut self, points: &[ChartPoint], label: &str) -> RenderHandle {
        let mut view = self.0.lock();
        view.next_handle += 1;
        let handle = RenderHandle(view.next_handle);
        view.chart = Some(ChartView {
            handle,
            label: label.to_string(),
            points: points.to_vec(),
        });
        handle
    }

    fn append_point(&mut self, handle: RenderHandle, point: &ChartPoint) {
        if let Some(chart) = self
            .0
            .lock()
            .chart
            .as_mut()
            .filter(|chart| chart.handle == handle)
        {
            chart.points.push(point.clone());
        }
    }

    fn destroy(&mut self, handle: RenderHandle) {
        let mut view = self.0.lock();
        if view.chart.as_ref().is_some_and(|chart| chart.handle == handle) {
            view.chart = None;
        }
    }
}
