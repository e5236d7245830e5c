use serde::{Deserialize, Serialize};

use super::chart::ChartStyle;
use super::performance::PortfolioPerformance;
use super::selection::Selection;
use super::table::{PriceTable, VolumeTable};

/// Tables returned by one provider fetch.
///
/// Immutable once built; the market data service shares it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub prices: PriceTable,
    /// `None` when no provider supplied volume. Not an error.
    pub volume: Option<VolumeTable>,
    /// Requested symbols that came back without any data.
    pub missing: Vec<String>,
}

/// What the presenter receives after each interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardView {
    /// No ticker chosen. Rendered as a warning, never as "all tickers".
    NothingSelected {
        /// How many tickers could have been chosen
        available: usize,
    },
    Report(DashboardReport),
}

/// Everything computed for one non-empty selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub selection: Selection,
    pub chart_style: ChartStyle,

    /// Close prices restricted to the selection
    pub prices: PriceTable,

    /// Volume restricted to the selection, if available for every ticker
    pub volume: Option<VolumeTable>,

    /// Equal-weight portfolio over the selection, with the per-asset
    /// statistics in selection order
    pub portfolio: PortfolioPerformance,
}
