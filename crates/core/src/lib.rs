pub mod errors;
pub mod models;
pub mod presenter;
pub mod providers;
pub mod services;

use std::sync::Arc;

use models::{
    chart::ChartStyle,
    selection::{RangeSlider, Selection},
    settings::DashboardSettings,
    table::PriceTable,
    view::{DashboardReport, DashboardView, MarketData},
};
use providers::registry::ProviderRegistry;
use services::{
    analytics_service::AnalyticsService, catalog_service::CatalogService,
    market_data_service::MarketDataService, selection_service::SelectionService,
};
use tracing::debug;

use errors::CoreError;

/// Main entry point for the dashboard core library.
///
/// Holds the ticker catalog, the memoized market data and all services needed
/// to turn a user selection into a [`DashboardView`].
#[must_use]
pub struct StockDashboard {
    settings: DashboardSettings,
    catalog: Vec<String>,
    market_data_service: MarketDataService,
    selection_service: SelectionService,
    analytics_service: AnalyticsService,
}

impl std::fmt::Debug for StockDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockDashboard")
            .field("settings", &self.settings)
            .field("catalog", &self.catalog.len())
            .field("cached_fetches", &self.market_data_service.cached_entries())
            .finish()
    }
}

impl StockDashboard {
    /// Create a dashboard with the default providers for these settings.
    pub fn new(settings: DashboardSettings) -> Result<Self, CoreError> {
        let registry = ProviderRegistry::new_with_defaults(&settings.api_keys);
        Self::with_registry(settings, registry)
    }

    /// Create a dashboard backed by a caller-supplied provider registry.
    pub fn with_registry(
        settings: DashboardSettings,
        registry: ProviderRegistry,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            settings,
            catalog: Vec::new(),
            market_data_service: MarketDataService::new(registry),
            selection_service: SelectionService::new(),
            analytics_service: AnalyticsService::new(),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    // ── Catalog ─────────────────────────────────────────────────────

    /// Load the ticker catalog from `settings.catalog_path`.
    pub fn load_catalog(&mut self) -> Result<&[String], CoreError> {
        let symbols =
            CatalogService::from_settings(&self.settings).load(&self.settings.catalog_path)?;
        self.set_catalog(symbols);
        Ok(&self.catalog)
    }

    /// Replace the catalog. Cached market data is dropped if it changed.
    pub fn set_catalog(&mut self, symbols: Vec<String>) {
        if symbols != self.catalog {
            self.market_data_service.invalidate();
            self.catalog = symbols;
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    // ── Market data ─────────────────────────────────────────────────

    /// Prices for `symbols` over the configured history window (memoized).
    pub async fn load_prices<S: AsRef<str>>(
        &mut self,
        symbols: &[S],
    ) -> Result<Arc<MarketData>, CoreError> {
        let (from, to) = (self.settings.history_start, self.settings.history_end);
        self.market_data_service.fetch(symbols, from, to).await
    }

    /// Prices for the whole catalog over the configured history window.
    pub async fn load_catalog_prices(&mut self) -> Result<Arc<MarketData>, CoreError> {
        let symbols = self.catalog.clone();
        if symbols.is_empty() {
            return Err(CoreError::CatalogLoad("ticker catalog is empty".into()));
        }
        self.load_prices(&symbols).await
    }

    /// Number of memoized fetches.
    #[must_use]
    pub fn cached_fetches(&self) -> usize {
        self.market_data_service.cached_entries()
    }

    /// Drop all memoized market data.
    pub fn invalidate_cache(&mut self) {
        self.market_data_service.invalidate();
    }

    /// Names of the registered providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.market_data_service.provider_names()
    }

    // ── Selection ───────────────────────────────────────────────────

    /// The date-range control for a table: its first to last date, stepping
    /// `settings.slider_step_days`.
    pub fn range_slider(&self, table: &PriceTable) -> Result<RangeSlider, CoreError> {
        match (table.first_date(), table.last_date()) {
            (Some(min), Some(max)) => RangeSlider::new(min, max, self.settings.slider_step_days),
            _ => Err(CoreError::EmptyRange {
                start: self.settings.history_start,
                end: self.settings.history_end,
            }),
        }
    }

    /// Run the selection through the filter and the analyzer.
    ///
    /// No ticker selected yields [`DashboardView::NothingSelected`]; it is
    /// never read as "all tickers". Volume is filtered with the same
    /// selection and left out when unavailable for any selected ticker.
    pub fn evaluate(
        &self,
        data: &MarketData,
        selection: &Selection,
        chart_style: ChartStyle,
    ) -> Result<DashboardView, CoreError> {
        if selection.is_empty() {
            return Ok(DashboardView::NothingSelected {
                available: data.prices.columns().len(),
            });
        }

        let prices = self.selection_service.filter(&data.prices, selection)?;

        let volume = data.volume.as_ref().and_then(|table| {
            match self.selection_service.filter(table, selection) {
                Ok(filtered) => Some(filtered),
                Err(e) => {
                    debug!("Volume not shown for this selection: {e}");
                    None
                }
            }
        });

        let portfolio = self.analytics_service.portfolio_performance(
            &prices,
            &selection.tickers,
            self.settings.unit_investment,
        )?;

        Ok(DashboardView::Report(DashboardReport {
            selection: selection.clone(),
            chart_style,
            prices,
            volume,
            portfolio,
        }))
    }
}
