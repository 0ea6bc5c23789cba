use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use pricewatch_data::{
    config::SyncConfig,
    error::DataError,
    exchange::VenueRegistry,
    instrument::{Symbol, VenueId},
    selection::SelectionContext,
    timeframe::Timeframe,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use state::{SharedView, TuiDashboard, TuiRenderer, ViewState};
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod state;
mod ui;

/// Default log file, the terminal itself is owned by the UI.
const DEFAULT_LOG_FILE: &str = "pricewatch.log";

/// User selection forwarded from the render loop to the selection task.
#[derive(Debug, Clone)]
enum Command {
    SelectVenue(VenueId),
    SelectSymbol(Symbol),
    SelectTimeframe(Timeframe),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = SyncConfig::from_env();
    info!(?config, "starting pricewatch");
    let registry = VenueRegistry::with_default_venues(&config)?;

    let view = ViewState::shared();
    let context = SelectionContext::new(
        registry,
        TuiDashboard(view.clone()),
        TuiRenderer(view.clone()),
        config,
    );

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let selection = tokio::spawn(run_selection(context, command_rx, view.clone()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run TUI
    let res = run_app(&mut terminal, view, command_tx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    selection.abort();
    if let Err(error) = &res {
        error!(%error, "terminal loop failed");
    }
    info!("stopped pricewatch");

    res.map_err(Into::into)
}

fn init_logging() -> io::Result<()> {
    let path = std::env::var("PRICEWATCH_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = std::fs::File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();

    Ok(())
}

/// Own the [`SelectionContext`] and apply selections in the order they were made.
async fn run_selection(
    mut context: SelectionContext<TuiDashboard, TuiRenderer>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    view: SharedView,
) {
    let result = context.init().await;
    sync_view(&context, &view, result);

    while let Some(command) = commands.recv().await {
        let result = match command {
            Command::SelectVenue(venue) => context.select_venue(&venue).await,
            Command::SelectSymbol(symbol) => context.select_symbol(&symbol),
            Command::SelectTimeframe(timeframe) => context.select_timeframe(timeframe),
        };
        sync_view(&context, &view, result);
    }
}

fn sync_view(
    context: &SelectionContext<TuiDashboard, TuiRenderer>,
    view: &SharedView,
    result: Result<(), DataError>,
) {
    let mut view = view.lock();
    view.selection = context.state().clone();
    view.last_error = match result {
        Ok(()) => None,
        Err(error) => {
            warn!(%error, "selection failed");
            Some(error.to_string())
        }
    };
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    view: SharedView,
    commands: mpsc::UnboundedSender<Command>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();

    loop {
        let snapshot = view.lock().clone();
        terminal.draw(|f| ui::ui(f, &snapshot))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let command = match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Tab => view.lock().venue_at_offset(1).map(Command::SelectVenue),
                    KeyCode::BackTab => view.lock().venue_at_offset(-1).map(Command::SelectVenue),
                    KeyCode::Up => {
                        view.lock().move_cursor(-1);
                        None
                    }
                    KeyCode::Down => {
                        view.lock().move_cursor(1);
                        None
                    }
                    KeyCode::Enter => view.lock().cursor_symbol().cloned().map(Command::SelectSymbol),
                    KeyCode::Char(digit @ '1'..='5') => digit
                        .to_digit(10)
                        .and_then(|digit| Timeframe::ALL.get(digit as usize - 1).copied())
                        .map(Command::SelectTimeframe),
                    _ => None,
                };

                if let Some(command) = command {
                    if commands.send(command).is_err() {
                        warn!("selection task stopped, exiting");
                        return Ok(());
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = std::time::Instant::now();
        }
    }
}
