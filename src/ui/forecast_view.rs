//! Forecast screen UI
//!
//! Renders the single forecast screen for every [`DisplayState`]: a hint
//! before the first fetch, a loading message, the error panel, or the
//! current conditions with hourly and daily sections.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::data::{
    format_humidity, DailyForecastEntry, ForecastSummary, HourlyForecastEntry, TempUnit,
};
use crate::state::DisplayState;

mod colors {
    use ratatui::style::Color;

    /// Section headers
    pub const HEADER: Color = Color::Cyan;
    /// Primary text
    pub const PRIMARY: Color = Color::White;
    /// Secondary/dimmed text
    pub const SECONDARY: Color = Color::Gray;
    /// Hints and missing data
    pub const MUTED: Color = Color::DarkGray;
    /// Error messages
    pub const ERROR: Color = Color::Red;
}

/// Width of one hour column in the hourly strip
const HOUR_COLUMN_WIDTH: usize = 7;

/// Renders the forecast screen for `state`
pub fn render(frame: &mut Frame, state: &DisplayState) {
    let area = frame.area();

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            " pointcast ",
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = main_block.inner(area);
    frame.render_widget(main_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    match state {
        DisplayState::Empty => {
            render_message(frame, chunks[0], "Press r to fetch the forecast", colors::MUTED)
        }
        DisplayState::Loading => {
            render_message(frame, chunks[0], "Fetching forecast...", colors::HEADER)
        }
        DisplayState::Error(message) => render_error(frame, chunks[0], message),
        DisplayState::Success { summary, unit } => {
            render_summary(frame, chunks[0], summary, *unit)
        }
    }

    render_help_text(frame, chunks[1]);
}

/// Renders a single centered message
fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(area);

    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, chunks[1]);
}

fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(build_error_lines(message))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn build_error_lines(message: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "Could not load the forecast",
            Style::default()
                .fg(colors::ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(colors::ERROR),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().fg(colors::MUTED),
        )),
    ]
}

fn render_summary(frame: &mut Frame, area: Rect, summary: &ForecastSummary, unit: TempUnit) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(build_current_lines(summary, unit)), chunks[0]);
    frame.render_widget(
        Paragraph::new(build_hourly_lines(&summary.hourly, unit)),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(build_daily_lines(&summary.daily, unit)),
        chunks[2],
    );
}

/// Location header and current conditions
fn build_current_lines(summary: &ForecastSummary, unit: TempUnit) -> Vec<Line<'static>> {
    let current_condition = summary.hourly.first().map(|h| h.condition);

    let mut headline = vec![Span::styled(
        summary.current_temperature.display(unit),
        Style::default()
            .fg(temperature_color(summary.current_temperature.celsius))
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(condition) = current_condition {
        headline.push(Span::raw(format!("  {} {}", condition.icon(), condition.tag())));
    }

    vec![
        Line::from(Span::styled(
            summary.location.clone(),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(headline),
        Line::from(Span::styled(
            format!(
                "Humidity: {}   Wind: {}",
                summary.humidity_label(),
                summary.wind_label()
            ),
            Style::default().fg(colors::SECONDARY),
        )),
        Line::from(""),
    ]
}

/// Hourly strip: one column per hour with time, icon + temperature and humidity rows
fn build_hourly_lines(hourly: &[HourlyForecastEntry], unit: TempUnit) -> Vec<Line<'static>> {
    let mut lines = vec![section_header("HOURLY")];

    if hourly.is_empty() {
        lines.push(Line::from(Span::styled(
            "No hourly forecast available",
            Style::default().fg(colors::MUTED),
        )));
        return lines;
    }

    let times = hourly
        .iter()
        .map(|h| {
            Span::styled(
                format!("{:<w$}", h.time, w = HOUR_COLUMN_WIDTH),
                Style::default().fg(colors::SECONDARY),
            )
        })
        .collect::<Vec<_>>();
    let temps = hourly
        .iter()
        .map(|h| {
            Span::styled(
                format!(
                    "{:<w$}",
                    format!("{} {:.0}°", h.condition.icon(), h.temperature.value(unit)),
                    w = HOUR_COLUMN_WIDTH
                ),
                Style::default().fg(temperature_color(h.temperature.celsius)),
            )
        })
        .collect::<Vec<_>>();
    let humidity = hourly
        .iter()
        .map(|h| {
            Span::styled(
                format!("{:<w$}", format_humidity(h.humidity), w = HOUR_COLUMN_WIDTH),
                Style::default().fg(colors::MUTED),
            )
        })
        .collect::<Vec<_>>();

    lines.push(Line::from(times));
    lines.push(Line::from(temps));
    lines.push(Line::from(humidity));
    lines
}

fn build_daily_lines(daily: &[DailyForecastEntry], unit: TempUnit) -> Vec<Line<'static>> {
    let mut lines = vec![section_header("DAILY")];

    if daily.is_empty() {
        lines.push(Line::from(Span::styled(
            "No daily forecast available",
            Style::default().fg(colors::MUTED),
        )));
        return lines;
    }

    for day in daily {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<11}", day.day),
                Style::default().fg(colors::PRIMARY),
            ),
            Span::raw(format!("{}  ", day.condition.icon())),
            Span::styled(
                format!("{:>6}", day.high.display(unit)),
                Style::default().fg(temperature_color(day.high.celsius)),
            ),
            Span::styled(" / ", Style::default().fg(colors::MUTED)),
            Span::styled(
                format!("{:<6}", day.low.display(unit)),
                Style::default().fg(temperature_color(day.low.celsius)),
            ),
        ]));
    }

    lines
}

fn section_header(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(colors::HEADER)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Returns the color for a Celsius temperature
fn temperature_color(celsius: f64) -> Color {
    if celsius >= 30.0 {
        Color::Red
    } else if celsius >= 25.0 {
        Color::LightRed
    } else if celsius >= 20.0 {
        Color::Yellow
    } else if celsius >= 15.0 {
        Color::Green
    } else if celsius >= 10.0 {
        Color::Cyan
    } else {
        Color::Blue
    }
}

fn render_help_text(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(vec![
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::styled(" refresh  ", Style::default().fg(colors::MUTED)),
        Span::styled("u", Style::default().fg(Color::Yellow)),
        Span::styled(" °C/°F  ", Style::default().fg(colors::MUTED)),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::styled(" help  ", Style::default().fg(colors::MUTED)),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::styled(" quit", Style::default().fg(colors::MUTED)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(help, area);
}
