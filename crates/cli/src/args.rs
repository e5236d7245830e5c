use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use ibov_dashboard_core::models::chart::ChartStyle;
use ibov_dashboard_core::models::settings::DashboardSettings;

#[derive(Debug, Parser)]
#[command(name = "ibov-dashboard")]
#[command(version, about = "IBOV stock prices and equal-weight portfolio returns", long_about = None)]
pub struct Cli {
    /// JSON settings file (every field optional)
    #[arg(long, env = "IBOV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reference dataset with the ticker codes
    #[arg(long, env = "IBOV_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Field delimiter of the reference dataset
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Header of the column holding the raw codes
    #[arg(long)]
    pub code_column: Option<String>,

    /// Market suffix appended to each code
    #[arg(long)]
    pub suffix: Option<String>,

    /// First day of the downloaded history (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the downloaded history (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Tickers to select, comma separated (PETR4 or PETR4.SA)
    #[arg(short, long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Start of the selected interval (defaults to the first trading day)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the selected interval (defaults to the last trading day)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Chart type (line, area)
    #[arg(short, long, default_value = "line")]
    pub chart: ChartStyle,

    /// Amount invested in each asset of the portfolio
    #[arg(long)]
    pub investment: Option<f64>,

    /// Step of the date-range control, in days
    #[arg(long)]
    pub step_days: Option<i64>,

    /// Use --from/--to as given instead of snapping them to the range steps
    #[arg(long)]
    pub no_snap: bool,

    /// Print the dashboard as JSON instead of charts
    #[arg(long)]
    pub json: bool,

    /// Keep running and read commands from stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Alpha Vantage API key, enables the fallback provider
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub alphavantage_key: Option<String>,
}

impl Cli {
    /// Defaults, then the JSON file, then flags and environment.
    pub fn load_settings(&self) -> anyhow::Result<DashboardSettings> {
        let mut settings = match &self.config {
            Some(path) => DashboardSettings::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => DashboardSettings::default(),
        };
        self.apply(&mut settings);
        settings.validate().context("invalid settings")?;
        Ok(settings)
    }

    /// Overwrite the settings with every flag that was given.
    pub fn apply(&self, settings: &mut DashboardSettings) {
        if let Some(path) = &self.catalog {
            settings.catalog_path = path.clone();
        }
        if let Some(delimiter) = self.delimiter {
            settings.catalog_delimiter = delimiter;
        }
        if let Some(column) = &self.code_column {
            settings.code_column = column.clone();
        }
        if let Some(suffix) = &self.suffix {
            settings.market_suffix = suffix.clone();
        }
        if let Some(start) = self.start {
            settings.history_start = start;
        }
        if let Some(end) = self.end {
            settings.history_end = end;
        }
        if let Some(investment) = self.investment {
            settings.unit_investment = investment;
        }
        if let Some(step) = self.step_days {
            settings.slider_step_days = step;
        }
        if let Some(key) = &self.alphavantage_key {
            settings
                .api_keys
                .insert("alphavantage".to_string(), key.clone());
        }
    }
}
