use std::io::{IsTerminal, Write};

use chrono::{Datelike, NaiveDate};
use crossterm::style::{style, Color as TermColor, Stylize};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart as ChartWidget, Dataset, GraphType, Widget};

use ibov_dashboard_core::errors::CoreError;
use ibov_dashboard_core::models::chart::{Chart, ChartStyle};
use ibov_dashboard_core::models::view::{DashboardReport, DashboardView};
use ibov_dashboard_core::presenter::Presenter;
use ibov_dashboard_core::services::chart_service::ChartService;

const DEFAULT_WIDTH: u16 = 100;
const CHART_HEIGHT: u16 = 20;

const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::Green,
    Color::LightRed,
    Color::LightBlue,
    Color::LightCyan,
    Color::LightMagenta,
];

// ── Formatting helpers ──────────────────────────────────────────────

/// "R$12.34"
pub fn format_money(value: f64) -> String {
    format!("R${value:.2}")
}

/// A return fraction as a percentage with two decimals ("-10.00%").
pub fn format_percent(fraction: f64) -> String {
    let pct = fraction * 100.0;
    // Keep "-0.00%" out of the output.
    let pct = if pct.abs() < 0.005 { 0.0 } else { pct };
    format!("{pct:.2}%")
}

/// Compact volume figure ("1.50M", "320.00K").
pub fn format_volume(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

/// Green for gains, red for losses, nothing for flat.
pub fn sign_color(fraction: f64) -> Option<TermColor> {
    if fraction > 0.0 {
        Some(TermColor::Green)
    } else if fraction < 0.0 {
        Some(TermColor::Red)
    } else {
        None
    }
}

// ── Terminal presenter ──────────────────────────────────────────────

/// Renders charts as braille plots and the statistics as coloured text.
pub struct TerminalPresenter {
    charts: ChartService,
    color: bool,
    width: u16,
    height: u16,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        let color = std::io::stdout().is_terminal();
        let width = crossterm::terminal::size()
            .map(|(w, _)| w)
            .unwrap_or(DEFAULT_WIDTH);
        Self::with_options(color, width, CHART_HEIGHT)
    }

    pub fn with_options(color: bool, width: u16, height: u16) -> Self {
        Self {
            charts: ChartService::new(),
            color,
            width: width.max(40),
            height: height.max(8),
        }
    }

    pub fn write_view<W: Write>(&self, out: &mut W, view: &DashboardView) -> Result<(), CoreError> {
        match view {
            DashboardView::NothingSelected { available } => {
                let text = format!(
                    "Please select at least one of the {available} tickers to see charts and statistics."
                );
                writeln!(out, "{}", self.paint(text, Some(TermColor::Yellow)))?;
            }
            DashboardView::Report(report) => self.write_report(out, report)?,
        }
        Ok(())
    }

    fn write_report<W: Write>(&self, out: &mut W, report: &DashboardReport) -> Result<(), CoreError> {
        let selection = &report.selection;
        writeln!(
            out,
            "{} ({} to {})",
            self.heading("IBOV stock prices"),
            selection.start,
            selection.end
        )?;

        let price_chart = self.charts.price_chart(&report.prices, report.chart_style);
        self.write_chart(out, &price_chart, format_money)?;

        writeln!(out, "{}", self.heading("Summary statistics"))?;
        for asset in &report.portfolio.assets {
            let change = self.paint(format_percent(asset.return_fraction), sign_color(asset.return_fraction));
            writeln!(
                out,
                "  {}: initial {} ({}), final {} ({}), change {}, mean {}",
                asset.ticker,
                format_money(asset.initial_price),
                asset.start_date,
                format_money(asset.final_price),
                asset.end_date,
                change,
                format_money(asset.mean_price),
            )?;
        }

        writeln!(out)?;
        match &report.volume {
            Some(volume) => {
                let volume_chart = self.charts.volume_chart(volume);
                self.write_chart(out, &volume_chart, format_volume)?;
            }
            None => writeln!(out, "Volume data not available for the selected tickers.")?,
        }

        let portfolio = &report.portfolio;
        writeln!(
            out,
            "{} ({} per asset)",
            self.heading("Portfolio performance"),
            format_money(portfolio.unit_investment)
        )?;
        for ((ticker, value), asset) in portfolio.position_values().iter().zip(&portfolio.assets) {
            writeln!(
                out,
                "  {ticker}: {} return, {} → {}",
                self.paint(format_percent(asset.return_fraction), sign_color(asset.return_fraction)),
                format_money(portfolio.unit_investment),
                format_money(*value),
            )?;
        }
        writeln!(
            out,
            "  Total portfolio return: {} ({} → {})",
            self.paint(format_percent(portfolio.return_fraction), sign_color(portfolio.return_fraction)),
            format_money(portfolio.initial_value),
            format_money(portfolio.final_value),
        )?;
        Ok(())
    }

    fn write_chart<W: Write>(
        &self,
        out: &mut W,
        chart: &Chart,
        y_label: fn(f64) -> String,
    ) -> Result<(), CoreError> {
        for line in self.render_chart(chart, y_label) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Draw a chart into an off-screen buffer and return it line by line.
    pub fn render_chart(&self, chart: &Chart, y_label: fn(f64) -> String) -> Vec<String> {
        let (Some((first, last)), Some((lo, hi))) = (chart.date_bounds(), chart.value_bounds())
        else {
            return vec![format!("{}: no data in the selected range", chart.title)];
        };

        let points: Vec<Vec<(f64, f64)>> = chart
            .series
            .iter()
            .map(|s| s.points.iter().map(|p| (day_number(p.date), p.value)).collect())
            .collect();

        let graph_type = match chart.style {
            ChartStyle::Line => GraphType::Line,
            ChartStyle::Area => GraphType::Bar,
        };

        let datasets = chart
            .series
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (series, data))| {
                Dataset::default()
                    .name(series.label.clone())
                    .marker(Marker::Braille)
                    .graph_type(graph_type)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(data)
            })
            .collect();

        let (x_min, x_max) = (day_number(first), day_number(last).max(day_number(first) + 1.0));
        let (y_min, y_max) = y_bounds(chart.style, lo, hi);
        let mid_date = first + (last - first) / 2;

        let widget = ChartWidget::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ({}) ", chart.title, chart.style)),
            )
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([x_min, x_max])
                    .labels(vec![
                        Span::raw(first.to_string()),
                        Span::raw(mid_date.to_string()),
                        Span::raw(last.to_string()),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_min, y_max])
                    .labels(vec![
                        Span::raw(y_label(y_min)),
                        Span::raw(y_label((y_min + y_max) / 2.0)),
                        Span::raw(y_label(y_max)),
                    ]),
            );

        let area = Rect::new(0, 0, self.width, self.height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        self.buffer_lines(&buf, area)
    }

    fn buffer_lines(&self, buf: &Buffer, area: Rect) -> Vec<String> {
        (area.top()..area.bottom())
            .map(|y| {
                let mut line = String::new();
                for x in area.left()..area.right() {
                    let cell = &buf[(x, y)];
                    match to_term_color(cell.fg).filter(|_| self.color) {
                        Some(color) => line.push_str(&style(cell.symbol()).with(color).to_string()),
                        None => line.push_str(cell.symbol()),
                    }
                }
                line.trim_end().to_string()
            })
            .collect()
    }

    fn heading(&self, text: &str) -> String {
        if self.color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint(&self, text: String, color: Option<TermColor>) -> String {
        match color {
            Some(color) if self.color => style(text).with(color).to_string(),
            _ => text,
        }
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, view: &DashboardView) -> Result<(), CoreError> {
        let mut out = std::io::stdout().lock();
        self.write_view(&mut out, view)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Area charts are filled down to zero; line charts get a small margin.
fn y_bounds(style: ChartStyle, lo: f64, hi: f64) -> (f64, f64) {
    let pad = if hi > lo { (hi - lo) * 0.05 } else { hi.abs().max(1.0) * 0.05 };
    match style {
        ChartStyle::Area => (lo.min(0.0), hi + pad),
        ChartStyle::Line => ((lo - pad).max(0.0), hi + pad),
    }
}

fn to_term_color(color: Color) -> Option<TermColor> {
    match color {
        Color::Cyan => Some(TermColor::Cyan),
        Color::Yellow => Some(TermColor::Yellow),
        Color::Magenta => Some(TermColor::Magenta),
        Color::Green => Some(TermColor::Green),
        Color::Red => Some(TermColor::Red),
        Color::LightRed => Some(TermColor::Red),
        Color::LightBlue => Some(TermColor::Blue),
        Color::LightCyan => Some(TermColor::Cyan),
        Color::LightMagenta => Some(TermColor::Magenta),
        Color::Gray => Some(TermColor::Grey),
        _ => None,
    }
}

// ── JSON presenter ──────────────────────────────────────────────────

/// Writes each view as one JSON document.
pub struct JsonPresenter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }
}

impl JsonPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), true)
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, view: &DashboardView) -> Result<(), CoreError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, view)?;
        } else {
            serde_json::to_writer(&mut self.writer, view)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
