use crate::errors::CoreError;
use crate::models::performance::{AssetPerformance, PortfolioPerformance};
use crate::models::table::PriceTable;

/// Computes per-asset returns and the equal-weight portfolio return.
///
/// All results are plain ratios (0.05 = +5%); nothing is rounded here, so
/// chained computations do not accumulate rounding error. Formatting belongs
/// to the presenter.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Return statistics of one ticker over the table's rows.
    ///
    /// Initial and final prices are the first and last present values in row
    /// order; rows where the ticker has no value are ignored, including for
    /// the mean.
    pub fn asset_performance(
        &self,
        table: &PriceTable,
        ticker: &str,
    ) -> Result<AssetPerformance, CoreError> {
        let column = table
            .column(ticker)
            .ok_or_else(|| CoreError::UnknownTicker(ticker.to_string()))?;

        let mut present = table
            .index()
            .iter()
            .zip(&column.values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)));

        let (start_date, initial_price) = present
            .next()
            .ok_or_else(|| CoreError::NoPriceData(ticker.to_string()))?;

        let mut end_date = start_date;
        let mut final_price = initial_price;
        let mut sum = initial_price;
        let mut observations = 1usize;
        for (date, value) in present {
            end_date = date;
            final_price = value;
            sum += value;
            observations += 1;
        }

        if initial_price == 0.0 {
            return Err(CoreError::ZeroBasePrice(ticker.to_string()));
        }

        Ok(AssetPerformance {
            ticker: ticker.to_string(),
            start_date,
            initial_price,
            end_date,
            final_price,
            return_fraction: (final_price - initial_price) / initial_price,
            mean_price: sum / observations as f64,
            observations,
        })
    }

    /// Equal-weight portfolio over `tickers`.
    ///
    /// Each asset receives `unit_investment` at the first row; its ending value
    /// is `unit_investment × (1 + return)`. An empty `tickers` list is an
    /// error: the caller decides what "nothing selected" means.
    pub fn portfolio_performance<S: AsRef<str>>(
        &self,
        table: &PriceTable,
        tickers: &[S],
        unit_investment: f64,
    ) -> Result<PortfolioPerformance, CoreError> {
        if tickers.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        if !unit_investment.is_finite() || unit_investment <= 0.0 {
            return Err(CoreError::Validation(format!(
                "unit investment must be a positive number, got {unit_investment}"
            )));
        }

        let assets = tickers
            .iter()
            .map(|t| self.asset_performance(table, t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let initial_value = unit_investment * assets.len() as f64;
        let final_value: f64 = assets
            .iter()
            .map(|a| unit_investment * (1.0 + a.return_fraction))
            .sum();

        Ok(PortfolioPerformance {
            unit_investment,
            initial_value,
            final_value,
            return_fraction: (final_value - initial_value) / initial_value,
            assets,
        })
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
