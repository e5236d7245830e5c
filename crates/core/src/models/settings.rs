use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use super::selection::MAX_STEP_DAYS;

/// Market suffix appended to every B3 ticker code.
pub const B3_SUFFIX: &str = ".SA";

/// Amount put in each asset by the equal-weight portfolio.
pub const DEFAULT_UNIT_INVESTMENT: f64 = 1000.0;

/// Step of the date-range control, in days.
pub const DEFAULT_SLIDER_STEP_DAYS: i64 = 30;

/// User-configurable settings for the dashboard.
///
/// Every field has a default, so a partial JSON file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Reference dataset with the raw ticker codes (e.g. "IBOV.csv").
    pub catalog_path: PathBuf,

    /// Field delimiter of the reference dataset.
    pub catalog_delimiter: char,

    /// Header of the column holding the raw codes.
    pub code_column: String,

    /// Appended to each raw code (".SA" for B3).
    pub market_suffix: String,

    /// First day of the history window requested from providers.
    pub history_start: NaiveDate,

    /// Last day of the history window requested from providers.
    pub history_end: NaiveDate,

    /// Nominal amount per asset in the portfolio simulation.
    pub unit_investment: f64,

    /// Step of the date-range control.
    pub slider_step_days: i64,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    pub api_keys: HashMap<String, String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("IBOV.csv"),
            catalog_delimiter: ';',
            code_column: "Código".to_string(),
            market_suffix: B3_SUFFIX.to_string(),
            history_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            history_end: NaiveDate::from_ymd_opt(2024, 9, 22).unwrap_or_default(),
            unit_investment: DEFAULT_UNIT_INVESTMENT,
            slider_step_days: DEFAULT_SLIDER_STEP_DAYS,
            api_keys: HashMap::new(),
        }
    }
}

impl DashboardSettings {
    /// Read settings from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values that would make later steps fail in confusing ways.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.history_start > self.history_end {
            return Err(CoreError::Config(format!(
                "history_start ({}) is after history_end ({})",
                self.history_start, self.history_end
            )));
        }
        if !self.unit_investment.is_finite() || self.unit_investment <= 0.0 {
            return Err(CoreError::Config(format!(
                "unit_investment must be a positive number, got {}",
                self.unit_investment
            )));
        }
        if self.slider_step_days <= 0 || self.slider_step_days > MAX_STEP_DAYS {
            return Err(CoreError::Config(format!(
                "slider_step_days must be between 1 and {MAX_STEP_DAYS}, got {}",
                self.slider_step_days
            )));
        }
        if !self.catalog_delimiter.is_ascii() {
            return Err(CoreError::Config(format!(
                "catalog_delimiter must be a single ASCII character, got '{}'",
                self.catalog_delimiter
            )));
        }
        if self.code_column.trim().is_empty() {
            return Err(CoreError::Config("code_column must not be empty".into()));
        }
        Ok(())
    }
}
