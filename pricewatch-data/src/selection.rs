use crate::{
    board::{Board, SharedBoard},
    chart::Renderer,
    config::SyncConfig,
    dashboard::Dashboard,
    error::DataError,
    exchange::{DataSource, VenueRegistry},
    instrument::{Symbol, VenueId},
    scheduler::{PollContext, PollScheduler},
    timeframe::Timeframe,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Fully specified selection driving a poll session.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Deserialize, Serialize)]
pub struct ActiveSelection {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub timeframe: Timeframe,
}

/// [`SelectionContext`] state machine.
///
/// `Uninitialized -> VenueSelected -> SymbolLoading -> SymbolSelected`
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Deserialize, Serialize)]
pub enum SelectionState {
    #[default]
    Uninitialized,
    VenueSelected {
        venue: VenueId,
    },
    SymbolLoading {
        venue: VenueId,
    },
    SymbolSelected(ActiveSelection),
}

impl SelectionState {
    pub fn venue(&self) -> Option<&VenueId> {
        match self {
            SelectionState::Uninitialized => None,
            SelectionState::VenueSelected { venue } | SelectionState::SymbolLoading { venue } => {
                Some(venue)
            }
            SelectionState::SymbolSelected(active) => Some(&active.venue),
        }
    }

    pub fn active(&self) -> Option<&ActiveSelection> {
        match self {
            SelectionState::SymbolSelected(active) => Some(active),
            _ => None,
        }
    }
}

/// Ties user selection events (venue, symbol, timeframe) to poll session and chart restarts.
///
/// Every transition stops the previous work and invalidates its generation token before any
/// new fetch is issued, so results belonging to a superseded selection are discarded.
#[derive(Debug)]
pub struct SelectionContext<D, R> {
    registry: VenueRegistry,
    config: SyncConfig,
    board: SharedBoard<D, R>,
    scheduler: PollScheduler<D, R>,
    state: SelectionState,
    source: Option<Arc<dyn DataSource>>,
    symbols: Vec<Symbol>,
}

impl<D, R> SelectionContext<D, R>
where
    D: Dashboard,
    R: Renderer,
{
    pub fn new(registry: VenueRegistry, dashboard: D, renderer: R, config: SyncConfig) -> Self {
        let board = Board::new(dashboard, renderer).shared();
        Self {
            scheduler: PollScheduler::new(Arc::clone(&board), &config),
            registry,
            config,
            board,
            state: SelectionState::Uninitialized,
            source: None,
            symbols: Vec::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn board(&self) -> &SharedBoard<D, R> {
        &self.board
    }

    /// Symbols listed by the selected venue.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn venues(&self) -> Vec<VenueId> {
        self.registry.venues()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Populate the venue options and select the first venue.
    pub async fn init(&mut self) -> Result<(), DataError> {
        let venues = self.registry.venues();
        let first = venues
            .first()
            .cloned()
            .ok_or_else(|| DataError::InvalidSelection("no venues registered".to_string()))?;

        self.board.lock().dashboard_mut().populate_venue_options(&venues);
        info!(count = venues.len(), "populated venues");

        self.select_venue(&first).await
    }

    /// Select a venue, load its symbols and start polling its first symbol.
    ///
    /// An unknown venue is rejected with [`DataError::InvalidSelection`] and leaves the state
    /// unchanged. If the symbol list cannot be loaded the symbol options are cleared, the state
    /// becomes [`SelectionState::VenueSelected`] and the error is returned.
    pub async fn select_venue(&mut self, venue: &VenueId) -> Result<(), DataError> {
        let source = self.registry.get(venue)?;

        self.scheduler.stop();
        self.board.lock().reset();
        self.symbols.clear();
        self.source = Some(Arc::clone(&source));
        self.state = SelectionState::SymbolLoading {
            venue: venue.clone(),
        };
        info!(%venue, "loading symbols");

        let symbols = match source.list_symbols().await {
            Ok(symbols) => symbols,
            Err(error) => {
                warn!(%venue, %error, "failed to load symbols");
                self.board.lock().dashboard_mut().populate_symbol_options(&[]);
                self.state = SelectionState::VenueSelected {
                    venue: venue.clone(),
                };
                return Err(error);
            }
        };

        self.board
            .lock()
            .dashboard_mut()
            .populate_symbol_options(&symbols);
        self.symbols = symbols;

        match self.symbols.first().cloned() {
            Some(symbol) => {
                self.start_session(source, venue.clone(), symbol, self.config.default_timeframe);
            }
            None => {
                info!(%venue, "venue listed no symbols");
                self.state = SelectionState::VenueSelected {
                    venue: venue.clone(),
                };
            }
        }

        Ok(())
    }

    /// Switch the active symbol within the selected venue, keeping the current timeframe.
    pub fn select_symbol(&mut self, symbol: &Symbol) -> Result<(), DataError> {
        let SelectionState::SymbolSelected(active) = &self.state else {
            return Err(DataError::InvalidSelection(format!(
                "cannot select symbol {symbol} before a venue's symbols are loaded"
            )));
        };

        if !self.symbols.contains(symbol) {
            return Err(DataError::InvalidSelection(format!(
                "symbol {symbol} is not listed by {}",
                active.venue
            )));
        }

        let source = self
            .source
            .clone()
            .ok_or_else(|| DataError::InvalidSelection("no active venue".to_string()))?;
        let (venue, timeframe) = (active.venue.clone(), active.timeframe);

        self.start_session(source, venue, symbol.clone(), timeframe);
        Ok(())
    }

    /// Switch the chart timeframe. The price task keeps running on its original schedule.
    ///
    /// Selecting the active timeframe is a no-op.
    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Result<(), DataError> {
        let SelectionState::SymbolSelected(active) = &mut self.state else {
            return Err(DataError::InvalidSelection(format!(
                "cannot select timeframe {timeframe} without an active symbol"
            )));
        };

        if active.timeframe == timeframe {
            return Ok(());
        }

        self.scheduler.stop_chart();
        let token = self.board.lock().reset_chart();
        active.timeframe = timeframe;
        info!(symbol = %active.symbol, %timeframe, "selected timeframe");

        self.scheduler.restart_chart(timeframe, token);
        Ok(())
    }

    fn start_session(
        &mut self,
        source: Arc<dyn DataSource>,
        venue: VenueId,
        symbol: Symbol,
        timeframe: Timeframe,
    ) {
        self.scheduler.stop();
        let token = self.board.lock().reset();

        info!(%venue, %symbol, %timeframe, "selected symbol");
        self.scheduler.start(
            PollContext {
                source,
                venue: venue.clone(),
                symbol: symbol.clone(),
                timeframe,
            },
            token,
        );

        self.state = SelectionState::SymbolSelected(ActiveSelection {
            venue,
            symbol,
            timeframe,
        });
    }
}
