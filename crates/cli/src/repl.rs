use std::io::Write;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use ibov_dashboard_core::errors::CoreError;
use ibov_dashboard_core::models::chart::ChartStyle;
use ibov_dashboard_core::models::selection::{RangeSlider, Selection};
use ibov_dashboard_core::presenter::Presenter;
use ibov_dashboard_core::StockDashboard;

pub const HELP: &str = "\
Commands:
  select <TICKER>...     replace the selection (PETR4 or PETR4.SA)
  add <TICKER>...        add tickers to the selection
  remove <TICKER>...     remove tickers from the selection
  clear                  deselect everything
  range <FROM> <TO>      date interval, YYYY-MM-DD (snapped to the range steps)
  range all              the whole history
  chart line|area        chart type
  show                   render the dashboard again
  tickers [FILTER]       list the available tickers
  help                   this text
  quit                   leave";

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(Vec<String>),
    Add(Vec<String>),
    Remove(Vec<String>),
    Clear,
    Range { from: NaiveDate, to: NaiveDate },
    FullRange,
    Chart(ChartStyle),
    Show,
    Tickers(Option<String>),
    Help,
    Quit,
}

/// Parse a command line. Blank input gives `Ok(None)`.
pub fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<String> = words
        .flat_map(|w| w.split(','))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    let command = match head.to_lowercase().as_str() {
        "select" | "s" => Command::Select(require_tickers(head, rest)?),
        "add" | "a" => Command::Add(require_tickers(head, rest)?),
        "remove" | "rm" => Command::Remove(require_tickers(head, rest)?),
        "clear" => Command::Clear,
        "range" | "r" => match rest.as_slice() {
            [all] if all.eq_ignore_ascii_case("all") => Command::FullRange,
            [from, to] => Command::Range {
                from: parse_date(from)?,
                to: parse_date(to)?,
            },
            _ => bail!("usage: range <FROM> <TO> | range all"),
        },
        "chart" | "c" => match rest.as_slice() {
            [style] => Command::Chart(style.parse()?),
            _ => bail!("usage: chart line|area"),
        },
        "show" => Command::Show,
        "tickers" | "t" => Command::Tickers(rest.into_iter().next()),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn require_tickers(head: &str, tickers: Vec<String>) -> anyhow::Result<Vec<String>> {
    if tickers.is_empty() {
        bail!("usage: {head} <TICKER>...");
    }
    Ok(tickers)
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("'{s}' is not a YYYY-MM-DD date"))
}

/// Upper-case the code and append the market suffix if it is missing.
pub fn normalize_ticker(input: &str, suffix: &str) -> String {
    let code = input.trim().to_uppercase();
    if suffix.is_empty() || code.ends_with(&suffix.to_uppercase()) {
        code
    } else {
        format!("{code}{suffix}")
    }
}

/// What the user has picked so far.
#[derive(Debug, Clone)]
pub struct Session {
    pub tickers: Vec<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub chart: ChartStyle,
    slider: RangeSlider,
    suffix: String,
    snap: bool,
}

impl Session {
    /// Everything deselected, full range.
    pub fn new(slider: RangeSlider, suffix: impl Into<String>, chart: ChartStyle, snap: bool) -> Self {
        Self {
            tickers: Vec::new(),
            from: slider.min,
            to: slider.max,
            chart,
            slider,
            suffix: suffix.into(),
            snap,
        }
    }

    pub fn set_tickers<S: AsRef<str>>(&mut self, tickers: &[S]) {
        self.tickers.clear();
        self.add_tickers(tickers);
    }

    pub fn add_tickers<S: AsRef<str>>(&mut self, tickers: &[S]) {
        for t in tickers {
            let symbol = normalize_ticker(t.as_ref(), &self.suffix);
            if !self.tickers.contains(&symbol) {
                self.tickers.push(symbol);
            }
        }
    }

    pub fn remove_tickers<S: AsRef<str>>(&mut self, tickers: &[S]) {
        let gone: Vec<String> = tickers
            .iter()
            .map(|t| normalize_ticker(t.as_ref(), &self.suffix))
            .collect();
        self.tickers.retain(|t| !gone.contains(t));
    }

    /// Set the interval, snapped to the range steps unless snapping is off.
    pub fn set_range(&mut self, from: NaiveDate, to: NaiveDate) {
        if self.snap {
            (self.from, self.to) = self.slider.snap_range(from, to);
        } else {
            (self.from, self.to) = (from, to);
        }
    }

    /// Apply a state-changing command. Returns whether the dashboard should
    /// be rendered again.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::Select(t) => self.set_tickers(t),
            Command::Add(t) => self.add_tickers(t),
            Command::Remove(t) => self.remove_tickers(t),
            Command::Clear => self.tickers.clear(),
            Command::Range { from, to } => self.set_range(*from, *to),
            Command::FullRange => self.set_range(self.slider.min, self.slider.max),
            Command::Chart(style) => self.chart = *style,
            Command::Show => {}
            Command::Tickers(_) | Command::Help | Command::Quit => return false,
        }
        true
    }

    pub fn selection(&self) -> Result<Selection, CoreError> {
        Selection::new(self.tickers.clone(), self.from, self.to)
    }
}

/// Evaluate the session against the (memoized) catalog prices and present it.
pub async fn render(
    dashboard: &mut StockDashboard,
    session: &Session,
    presenter: &mut dyn Presenter,
) -> anyhow::Result<()> {
    let data = dashboard.load_catalog_prices().await?;
    let selection = session.selection()?;
    let view = dashboard.evaluate(&data, &selection, session.chart)?;
    presenter.present(&view)?;
    Ok(())
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(
    dashboard: &mut StockDashboard,
    session: &mut Session,
    presenter: &mut dyn Presenter,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}\n");
    if let Err(e) = render(dashboard, session, presenter).await {
        eprintln!("error: {e:#}");
    }

    loop {
        print!("ibov> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        };
        debug!(?command, "Interactive command");

        match &command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Tickers(filter) => list_tickers(dashboard.catalog(), filter.as_deref()),
            _ => {}
        }

        if session.apply(&command) {
            if let Err(e) = render(dashboard, session, presenter).await {
                eprintln!("error: {e:#}");
            }
        }
    }
    Ok(())
}

fn list_tickers(catalog: &[String], filter: Option<&str>) {
    let filter = filter.map(str::to_uppercase);
    let matching: Vec<&str> = catalog
        .iter()
        .filter(|t| filter.as_deref().map_or(true, |f| t.contains(f)))
        .map(String::as_str)
        .collect();
    for row in matching.chunks(8) {
        println!("  {}", row.join("  "));
    }
    println!("{} of {} tickers", matching.len(), catalog.len());
}
