#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # Pricewatch-Data
//! Market-data synchronization engine for a live price dashboard.
//!
//! A [`SelectionContext`](selection::SelectionContext) tracks the user's venue, symbol and
//! timeframe selection. Every selection change cancels the running
//! [`PollScheduler`](scheduler::PollScheduler) session and starts a new one, which:
//! * refreshes the 24h ticker on a fixed interval and publishes each price field to a
//!   [`Dashboard`](dashboard::Dashboard), "no data" where a field is missing or malformed.
//! * loads historical candles into a [`ChartManager`](chart::ChartManager) session drawn by a
//!   [`Renderer`](chart::Renderer), then appends one live point per candle period.
//!
//! Venues are served by [`DataSource`](exchange::DataSource) implementations looked up through
//! a [`VenueRegistry`](exchange::VenueRegistry). Built-in venues: binance, okx, bybit.
//!
//! ## Example
//! ```rust,ignore
//! let registry = VenueRegistry::with_default_venues(&config)?;
//! let mut context = SelectionContext::new(registry, dashboard, renderer, config);
//! context.init().await?;
//! context.select_timeframe(Timeframe::Hour1)?;
//! ```

/// Shared, lock protected state written by polling tasks: dashboard, chart and tokens.
pub mod board;

/// Chart session lifecycle and the [`Renderer`](chart::Renderer) boundary.
pub mod chart;

/// Engine configuration.
pub mod config;

/// [`Dashboard`](dashboard::Dashboard) user interface boundary.
pub mod dashboard;

/// All [`Error`](std::error::Error)s generated in Pricewatch-Data.
pub mod error;

/// [`DataSource`](exchange::DataSource) trait, venue registry and venue implementations.
pub mod exchange;

/// Display formatting of prices and chart timestamps.
pub mod format;

/// Venue and symbol identifiers.
pub mod instrument;

/// Normalised market data: tickers, candles and candle series.
pub mod market;

/// Periodic price and chart polling for one active selection.
pub mod scheduler;

/// Venue, symbol and timeframe selection state machine.
pub mod selection;

/// Candle granularity.
pub mod timeframe;

pub use self::{
    config::SyncConfig,
    error::DataError,
    exchange::{DataSource, VenueRegistry},
    selection::{SelectionContext, SelectionState},
    timeframe::Timeframe,
};
