use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Return statistics of one ticker over a filtered table.
///
/// `return_fraction` is a plain ratio: 0.05 means +5%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub ticker: String,

    /// Date and value of the first present price
    pub start_date: NaiveDate,
    pub initial_price: f64,

    /// Date and value of the last present price
    pub end_date: NaiveDate,
    pub final_price: f64,

    /// (final − initial) / initial
    pub return_fraction: f64,

    /// Arithmetic mean of the present prices
    pub mean_price: f64,

    /// Number of rows that had a price
    pub observations: usize,
}

/// Equal-weight portfolio: the same nominal amount put in every asset at the
/// start of the interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    /// Amount invested per asset
    pub unit_investment: f64,

    /// unit_investment × number of assets
    pub initial_value: f64,

    /// Σ unit_investment × (1 + asset return)
    pub final_value: f64,

    /// (final_value − initial_value) / initial_value
    pub return_fraction: f64,

    /// Per-asset breakdown, in selection order
    pub assets: Vec<AssetPerformance>,
}

impl PortfolioPerformance {
    /// Ending value of each position, in selection order.
    pub fn position_values(&self) -> Vec<(&str, f64)> {
        self.assets
            .iter()
            .map(|a| (a.ticker.as_str(), self.unit_investment * (1.0 + a.return_fraction)))
            .collect()
    }
}
