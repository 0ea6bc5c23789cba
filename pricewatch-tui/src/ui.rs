use crate::state::ViewState;
use chrono::Utc;
use pricewatch_data::{market::PriceField, timeframe::Timeframe};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph,
    },
};

const ACCENT: Color = Color::Rgb(138, 43, 226);
const MUTED: Color = Color::Rgb(128, 128, 128);
const BACKGROUND: Color = Color::Rgb(18, 18, 28);
const UP: Color = Color::Rgb(0, 255, 127);
const DOWN: Color = Color::Rgb(255, 69, 58);

pub fn ui(f: &mut Frame, state: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    render_status_bar(f, chunks[0], state);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(chunks[1]);

    // Left column: venues (top), symbols (bottom)
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(state.venues.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(main_chunks[0]);

    render_venues(f, left_chunks[0], state);
    render_symbols(f, left_chunks[1], state);

    // Right column: info panel (top), chart (bottom)
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(main_chunks[1]);

    render_info_panel(f, right_chunks[0], state);
    render_chart(f, right_chunks[1], state);
}

fn block(title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
}

fn render_status_bar(f: &mut Frame, area: Rect, state: &ViewState) {
    let selection = match state.selection.active() {
        Some(active) => format!(" {} · {} · {} ", active.venue, active.symbol, active.timeframe),
        None => match state.selection.venue() {
            Some(venue) => format!(" {venue} · loading "),
            None => " starting ".to_string(),
        },
    };

    let mut spans = vec![
        Span::styled(
            " ◆ PRICEWATCH ◆ ",
            Style::default()
                .fg(Color::Rgb(255, 215, 0))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(selection, Style::default().fg(Color::White)),
        Span::styled(
            format!(" ⏱  {} ", Utc::now().format("%H:%M:%S")),
            Style::default().fg(Color::Rgb(100, 149, 237)),
        ),
    ];

    if let Some(error) = &state.last_error {
        spans.push(Span::styled(format!(" ⚠ {error} "), Style::default().fg(DOWN)));
    }

    spans.push(Span::styled(
        " [Tab] Venue [↑↓⏎] Symbol [1-5] Timeframe [Q] Quit ",
        Style::default().fg(MUTED),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(BACKGROUND)),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_venues(f: &mut Frame, area: Rect, state: &ViewState) {
    let selected = state.selection.venue();
    let items = state
        .venues
        .iter()
        .map(|venue| {
            let style = if Some(venue) == selected {
                Style::default().fg(UP).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            ListItem::new(Span::styled(venue.to_string(), style))
        })
        .collect::<Vec<_>>();

    f.render_widget(List::new(items).block(block("Venues")), area);
}

fn render_symbols(f: &mut Frame, area: Rect, state: &ViewState) {
    let active = state.selection.active().map(|active| &active.symbol);
    let items = state
        .symbols
        .iter()
        .map(|symbol| {
            let marker = if Some(symbol) == active { "● " } else { "  " };
            ListItem::new(format!("{marker}{symbol}"))
        })
        .collect::<Vec<_>>();

    let list = List::new(items)
        .block(block(&format!("Symbols ({})", state.symbols.len())))
        .highlight_style(Style::default().bg(ACCENT).add_modifier(Modifier::BOLD));

    let mut list_state = ListState::default().with_selected(
        (!state.symbols.is_empty()).then_some(state.symbol_cursor),
    );
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_info_panel(f: &mut Frame, area: Rect, state: &ViewState) {
    let line = if state.panel_visible {
        let change_color = match state
            .prices
            .get(&PriceField::Change)
            .and_then(|value| value.value())
        {
            Some(change) if change < 0.0 => DOWN,
            Some(_) => UP,
            None => MUTED,
        };

        Line::from(
            PriceField::ALL
                .into_iter()
                .flat_map(|field| {
                    let value = state
                        .prices
                        .get(&field)
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "no data".to_string());
                    let color = match field {
                        PriceField::Change | PriceField::Percentage => change_color,
                        _ => Color::White,
                    };
                    [
                        Span::styled(format!(" {field}: "), Style::default().fg(MUTED)),
                        Span::styled(
                            format!("{value} "),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    } else {
        Line::from(Span::styled(" loading… ", Style::default().fg(MUTED)))
    };

    f.render_widget(Paragraph::new(line).block(block("Price")), area);
}

fn render_chart(f: &mut Frame, area: Rect, state: &ViewState) {
    let Some(chart) = state.chart.as_ref().filter(|chart| !chart.points.is_empty()) else {
        let timeframes = Timeframe::ALL
            .iter()
            .enumerate()
            .map(|(index, timeframe)| format!("[{}] {timeframe}", index + 1))
            .collect::<Vec<_>>()
            .join("  ");
        f.render_widget(
            Paragraph::new(format!("waiting for candles…   {timeframes}"))
                .style(Style::default().fg(MUTED))
                .block(block("Chart")),
            area,
        );
        return;
    };

    let data = chart
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| (index as f64, point.value))
        .collect::<Vec<_>>();

    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), (_, value)| {
            (min.min(*value), max.max(*value))
        });
    let padding = ((max - min) * 0.05).max(max.abs() * 0.0001);
    let y_bounds = [min - padding, max + padding];
    let x_bounds = [0.0, (data.len().saturating_sub(1)).max(1) as f64];

    let first_label = chart.points.first().map(|point| point.label.clone());
    let last_label = chart.points.last().map(|point| point.label.clone());

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data),
    ];

    let widget = Chart::new(datasets)
        .block(block(&chart.label))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds(x_bounds)
                .labels(first_label.into_iter().chain(last_label).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds(y_bounds)
                .labels(vec![format!("{:.2}", y_bounds[0]), format!("{:.2}", y_bounds[1])]),
        );

    f.render_widget(widget, area);
}
