//! Ratatui-based terminal UI.
//!
//! The TUI shows the current parameter snapshot, a chart of the computed view
//! and the view's table. Every key press maps to one `ParameterChange`; the app
//! applies it to a new snapshot and recomputes the whole view from the store.
//!
//! Clamping lives here, not in the engine: the date scrubber never leaves the
//! distinct-date range and top-N never drops below 1. If a recompute still
//! fails, the previous view stays on screen and the error goes to the status line.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tracing::{info, warn};

use crate::aggregate::ViewModel;
use crate::app::pipeline::{self, ViewRun};
use crate::cli::TuiArgs;
use crate::data::LoadOutcome;
use crate::domain::{Country, ParameterChange, SelectionParameters, SortKey};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{ChartBody, PointSeries, StackedBar, ViewPlottersChart};

/// Upper bound for the top-N control.
const MAX_TOP_N: usize = 50;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Load and validate before taking over the terminal so errors print normally.
    let path = pipeline::resolve_csv_path(&args.source)?;
    let load = pipeline::load_charts(&path)?;
    let params = pipeline::resolve_selection(&args.selection, &load.store)?;
    let first = pipeline::run_view(&load.store, &params)?;

    let mut app = App::new(load, first, path, args.export);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    load: LoadOutcome,
    source: PathBuf,
    export_path: PathBuf,
    /// Last successfully computed view (and the snapshot it came from).
    run: ViewRun,
    status: String,
}

impl App {
    fn new(load: LoadOutcome, run: ViewRun, source: PathBuf, export_path: PathBuf) -> Self {
        let status = if load.row_errors.is_empty() {
            format!("Loaded {} rows.", load.rows_used())
        } else {
            format!("Loaded {} rows, skipped {} malformed.", load.rows_used(), load.row_errors.len())
        };
        Self {
            load,
            source,
            export_path,
            run,
            status,
        }
    }

    fn params(&self) -> &SelectionParameters {
        &self.run.params
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let n_dates = self.load.store.distinct_dates_ascending().len();
        let params = self.params().clone();

        let change = match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left if params.date_index > 0 => ParameterChange::SetDateIndex(params.date_index - 1),
            KeyCode::Right if params.date_index + 1 < n_dates => ParameterChange::SetDateIndex(params.date_index + 1),
            KeyCode::Left | KeyCode::Right => {
                self.status = "No more dates in that direction.".to_string();
                return false;
            }
            KeyCode::Home => ParameterChange::SetDateIndex(0),
            KeyCode::End => ParameterChange::SetDateIndex(n_dates.saturating_sub(1)),
            KeyCode::Char(c @ '1'..='3') => {
                let idx = (c as usize) - ('1' as usize);
                ParameterChange::ToggleCountry(Country::ALL[idx])
            }
            KeyCode::Char('+') | KeyCode::Char('=') => ParameterChange::SetTopN((params.top_n + 1).min(MAX_TOP_N)),
            KeyCode::Char('-') => ParameterChange::SetTopN(params.top_n.saturating_sub(1).max(1)),
            KeyCode::Char('s') => ParameterChange::SetSortKey(params.sort_key.toggled()),
            KeyCode::Tab => ParameterChange::SetViewMode(params.view_mode.next()),
            KeyCode::Char('e') => {
                self.export();
                return false;
            }
            _ => return false,
        };

        self.apply(change);
        false
    }

    /// Apply one change as a new snapshot and recompute. On failure the previous
    /// view (and its parameters) stay current.
    fn apply(&mut self, change: ParameterChange) {
        let next = self.params().apply(change);
        match pipeline::run_view(&self.load.store, &next) {
            Ok(run) => {
                self.status = describe(&run);
                self.run = run;
            }
            Err(err) => {
                warn!(error = %err, "recompute rejected");
                self.status = format!("Not applied: {err}");
            }
        }
    }

    fn export(&mut self) {
        let run = &self.run;
        match crate::io::export::write_view_json(&self.export_path, &run.params, run.date, &run.view) {
            Ok(()) => {
                info!(path = %self.export_path.display(), "exported view");
                self.status = format!("Exported view to {}", self.export_path.display());
            }
            Err(err) => self.status = format!("Export failed: {err}"),
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let params = self.params();
        let dates = self.load.store.distinct_dates_ascending();

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("charts", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {} | {}", params.view_mode.display_name(), self.source.display())),
        ]));

        let mut controls = Vec::new();
        for (idx, country) in Country::ALL.into_iter().enumerate() {
            let mark = if params.is_selected(country) { "[x]" } else { "[ ]" };
            controls.push(Span::styled(
                format!("{} {mark} {}  ", idx + 1, country.code()),
                Style::default().fg(country_color(country)),
            ));
        }
        let date_label = match self.run.date {
            Some(date) => format!("{date} ({}/{})", params.date_index + 1, dates.len()),
            None => "all dates".to_string(),
        };
        controls.push(Span::styled(
            format!(
                "| top: {} | sort: {} | date: {date_label}",
                params.top_n,
                params.sort_key.display_name()
            ),
            Style::default().fg(Color::Gray),
        ));
        lines.push(Line::from(controls));

        lines.push(Line::from(Span::styled(
            format!(
                "rows: read={} used={} rejected={} | view rows: {}",
                self.load.rows_read,
                self.load.rows_used(),
                self.load.row_errors.len(),
                self.run.view.len()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_table(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(self.params().view_mode.display_name())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.run.view.is_empty() {
            let msg = Paragraph::new("No data for the current selection.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let data = chart_data(&self.run.view);
        let body = if data.bars.is_empty() {
            ChartBody::Scatter(&data.series)
        } else {
            ChartBody::Bars(&data.bars)
        };
        let widget = ViewPlottersChart {
            body,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: data.x_label,
            y_label: data.y_label,
            fmt_x: fmt_axis,
            fmt_y: fmt_axis,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let text = crate::report::format_view(&self.run.view);
        let p = Paragraph::new(text).block(Block::default().title("Table").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ date  1/2/3 country  +/- top  s sort  Tab view  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn describe(run: &ViewRun) -> String {
    let params = &run.params;
    let mut parts = vec![format!("{} rows", run.view.len())];
    if let Some(date) = run.date {
        parts.push(date.to_string());
    }
    if let ViewModel::Artists { sort_key, .. } = &run.view {
        parts.push(format!("by {}", sort_key.display_name()));
    }
    parts.push(format!("top {}", params.top_n));
    parts.join(" | ")
}

/// Chart series and bounds derived from a view model.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    series: Vec<PointSeries>,
    bars: Vec<StackedBar>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &'static str,
    y_label: &'static str,
}

fn chart_data(view: &ViewModel) -> ChartData {
    match view {
        ViewModel::Snapshot { rows } => {
            let series = Country::ALL
                .into_iter()
                .map(|country| PointSeries {
                    color: country_rgb(country),
                    points: rows
                        .iter()
                        .filter(|e| e.country == country)
                        .map(|e| (e.rank as f64, e.streams as f64))
                        .collect(),
                })
                .filter(|s| !s.points.is_empty())
                .collect::<Vec<_>>();
            let max_rank = rows.iter().map(|e| e.rank).max().unwrap_or(1) as f64;
            let max_streams = rows.iter().map(|e| e.streams).max().unwrap_or(0) as f64;
            ChartData {
                series,
                bars: Vec::new(),
                x_bounds: [0.5, max_rank + 0.5],
                y_bounds: [0.0, padded(max_streams)],
                x_label: "rank",
                y_label: "streams",
            }
        }
        ViewModel::Artists { sort_key, rows } => {
            let n = rows.len();
            let bars = rows
                .iter()
                .enumerate()
                .map(|(idx, row)| {
                    let mut start = 0.0;
                    let segments = row
                        .per_country
                        .iter()
                        .map(|(&country, &value)| {
                            let end = start + value as f64;
                            let segment = (start, end, country_rgb(country));
                            start = end;
                            segment
                        })
                        .collect();
                    StackedBar {
                        // First row at the top.
                        slot: (n - idx) as f64,
                        segments,
                    }
                })
                .collect();
            let max_value = rows.iter().map(|r| r.value(*sort_key)).max().unwrap_or(0) as f64;
            ChartData {
                series: Vec::new(),
                bars,
                x_bounds: [0.0, padded(max_value)],
                y_bounds: [0.5, n as f64 + 0.5],
                x_label: match sort_key {
                    SortKey::ByTotalStreams => "streams",
                    SortKey::ByWeeksOnChart => "weeks on chart",
                },
                y_label: "artist",
            }
        }
        ViewModel::Songs { rows } => {
            // Color each song by the first country it charted in.
            let series = Country::ALL
                .into_iter()
                .map(|country| PointSeries {
                    color: country_rgb(country),
                    points: rows
                        .iter()
                        .filter(|r| r.countries.first() == Some(&country))
                        .map(|r| (r.chart_appearances as f64, r.total_streams as f64))
                        .collect(),
                })
                .filter(|s| !s.points.is_empty())
                .collect::<Vec<_>>();
            let max_apps = rows.iter().map(|r| r.chart_appearances).max().unwrap_or(0) as f64;
            let max_streams = rows.iter().map(|r| r.total_streams).max().unwrap_or(0) as f64;
            ChartData {
                series,
                bars: Vec::new(),
                x_bounds: [0.0, max_apps + 1.0],
                y_bounds: [0.0, padded(max_streams)],
                x_label: "chart appearances",
                y_label: "total streams",
            }
        }
    }
}

fn padded(max: f64) -> f64 {
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn country_rgb(country: Country) -> RGBColor {
    match country {
        Country::UnitedStates => RGBColor(0, 170, 255),
        Country::Mexico => RGBColor(0, 210, 90),
        Country::Canada => RGBColor(255, 70, 70),
    }
}

fn country_color(country: Country) -> Color {
    let RGBColor(r, g, b) = country_rgb(country);
    Color::Rgb(r, g, b)
}

/// Compact axis labels: `1.2M`, `350k`, `12`.
fn fmt_axis(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}
