// ═══════════════════════════════════════════════════════════════════
// Service Tests — CatalogService, SelectionService, AnalyticsService,
// MarketDataService, ChartService
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ibov_dashboard_core::errors::CoreError;
use ibov_dashboard_core::models::chart::ChartStyle;
use ibov_dashboard_core::models::price::{DailyQuote, PricePoint, PriceSeries};
use ibov_dashboard_core::models::selection::Selection;
use ibov_dashboard_core::models::settings::DashboardSettings;
use ibov_dashboard_core::models::table::{PriceTable, TimeSeriesTable};
use ibov_dashboard_core::providers::registry::ProviderRegistry;
use ibov_dashboard_core::providers::traits::MarketDataProvider;
use ibov_dashboard_core::services::analytics_service::AnalyticsService;
use ibov_dashboard_core::services::catalog_service::CatalogService;
use ibov_dashboard_core::services::chart_service::{
    ChartService, PRICE_CHART_TITLE, VOLUME_CHART_TITLE,
};
use ibov_dashboard_core::services::market_data_service::{FetchKey, MarketDataService};
use ibov_dashboard_core::services::selection_service::SelectionService;

// ═══════════════════════════════════════════════════════════════════
// Mock Providers
// ═══════════════════════════════════════════════════════════════════

struct MockMarketProvider {
    quotes: HashMap<String, Vec<DailyQuote>>,
    calls: Arc<AtomicUsize>,
    with_volume: bool,
}

impl MockMarketProvider {
    fn new(with_volume: bool) -> Self {
        let mut quotes = HashMap::new();
        let days = [d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)];
        let series = [
            ("PETR4.SA", [10.0, 12.0, 9.0], [1000.0, 1500.0, 800.0]),
            ("VALE3.SA", [20.0, 20.0, 22.0], [500.0, 400.0, 600.0]),
        ];
        for (symbol, closes, volumes) in series {
            let q = days
                .iter()
                .zip(closes.iter().zip(volumes.iter()))
                .map(|(date, (close, volume))| DailyQuote {
                    date: *date,
                    close: *close,
                    volume: with_volume.then_some(*volume),
                })
                .collect();
            quotes.insert(symbol.to_string(), q);
        }

        Self {
            quotes,
            calls: Arc::new(AtomicUsize::new(0)),
            with_volume,
        }
    }

    fn with_quotes(symbol: &str, quotes: Vec<DailyQuote>) -> Self {
        let mut map = HashMap::new();
        map.insert(symbol.to_string(), quotes);
        Self {
            quotes: map,
            calls: Arc::new(AtomicUsize::new(0)),
            with_volume: true,
        }
    }

    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketProvider {
    fn name(&self) -> &str {
        "MockMarket"
    }

    fn supports_volume(&self) -> bool {
        self.with_volume
    }

    async fn get_daily_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.quotes.get(symbol) {
            Some(quotes) => Ok(quotes
                .iter()
                .filter(|q| q.date >= from && q.date <= to)
                .cloned()
                .collect()),
            None => Err(CoreError::ProviderFetch {
                provider: "MockMarket".into(),
                message: format!("unknown symbol {symbol}"),
            }),
        }
    }
}

/// A mock provider that always fails.
struct FailingProvider;

#[async_trait]
impl MarketDataProvider for FailingProvider {
    fn name(&self) -> &str {
        "Failing"
    }

    fn supports_volume(&self) -> bool {
        true
    }

    async fn get_daily_history(
        &self,
        _symbol: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, CoreError> {
        Err(CoreError::Network("connection refused".into()))
    }
}

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn series(symbol: &str, points: &[(NaiveDate, f64)]) -> PriceSeries {
    PriceSeries::new(
        symbol,
        points
            .iter()
            .map(|(date, price)| PricePoint {
                date: *date,
                price: *price,
            })
            .collect(),
    )
}

/// A = [10, 12, 9], B = [20, 20, 22] on three consecutive days.
fn example_table() -> PriceTable {
    TimeSeriesTable::from_series(vec![
        series("A", &[(d(2024, 1, 1), 10.0), (d(2024, 1, 2), 12.0), (d(2024, 1, 3), 9.0)]),
        series("B", &[(d(2024, 1, 1), 20.0), (d(2024, 1, 2), 20.0), (d(2024, 1, 3), 22.0)]),
    ])
}

fn select(tickers: &[&str], start: NaiveDate, end: NaiveDate) -> Selection {
    Selection::new(tickers.iter().map(|s| s.to_string()).collect(), start, end).unwrap()
}

fn registry_with(provider: MockMarketProvider) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(provider));
    registry
}

fn b3_catalog() -> CatalogService {
    CatalogService::new(b';', "Código", ".SA")
}

// ═══════════════════════════════════════════════════════════════════
// CatalogService
// ═══════════════════════════════════════════════════════════════════

mod catalog_service {
    use super::*;

    #[test]
    fn normalizes_and_keeps_order() {
        let csv = "Código;Ação;Tipo\nPETR4;PETROBRAS;PN\nVALE3;VALE;ON\nITUB4;ITAUUNIBANCO;PN\n";
        let symbols = b3_catalog().load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(symbols, vec!["PETR4.SA", "VALE3.SA", "ITUB4.SA"]);
    }

    #[test]
    fn trims_codes() {
        let csv = "Código;Ação\n  PETR4  ;PETROBRAS\n";
        let symbols = b3_catalog().load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(symbols, vec!["PETR4.SA"]);
    }

    #[test]
    fn header_only_gives_empty_catalog() {
        let symbols = b3_catalog().load_from_reader("Código;Ação\n".as_bytes()).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn duplicates_are_preserved() {
        let csv = "Código\nPETR4\nPETR4\n";
        let symbols = b3_catalog().load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(symbols, vec!["PETR4.SA", "PETR4.SA"]);
    }

    #[test]
    fn blank_codes_are_skipped() {
        let csv = "Código;Ação\nPETR4;PETROBRAS\n;SEM CODIGO\nVALE3;VALE\n";
        let symbols = b3_catalog().load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(symbols, vec!["PETR4.SA", "VALE3.SA"]);
    }

    #[test]
    fn missing_code_column_fails() {
        let csv = "Ticker;Ação\nPETR4;PETROBRAS\n";
        let err = b3_catalog().load_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CoreError::CatalogLoad(ref m) if m.contains("Código")));
    }

    #[test]
    fn latin1_file_is_decoded() {
        // "Código;Ação" encoded as ISO-8859-1
        let mut bytes: Vec<u8> = b"C\xf3digo;A\xe7\xe3o\n".to_vec();
        bytes.extend_from_slice(b"BBAS3;BRASIL\n");
        let symbols = b3_catalog().load_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(symbols, vec!["BBAS3.SA"]);
    }

    #[test]
    fn utf8_bom_is_ignored() {
        let csv = "\u{feff}Código;Ação\nWEGE3;WEG\n";
        let symbols = b3_catalog().load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(symbols, vec!["WEGE3.SA"]);
    }

    #[test]
    fn custom_delimiter_and_suffix() {
        let svc = CatalogService::new(b',', "code", ".X");
        let symbols = svc.load_from_reader("code,name\nAAA,a\n".as_bytes()).unwrap();
        assert_eq!(symbols, vec!["AAA.X"]);
    }

    #[test]
    fn from_settings_uses_configured_columns() {
        let settings = DashboardSettings {
            catalog_delimiter: ',',
            code_column: "Ticker".into(),
            ..Default::default()
        };
        let svc = CatalogService::from_settings(&settings);
        let symbols = svc.load_from_reader("Ticker,Nome\nABEV3,AMBEV\n".as_bytes()).unwrap();
        assert_eq!(symbols, vec!["ABEV3.SA"]);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IBOV.csv");
        std::fs::write(&path, "Código;Ação\nPETR4;PETROBRAS\n").unwrap();
        assert_eq!(b3_catalog().load(&path).unwrap(), vec!["PETR4.SA"]);
    }

    #[test]
    fn missing_file_is_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = b3_catalog().load(dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, CoreError::CatalogLoad(ref m) if m.contains("cannot read")));
    }

    #[test]
    fn normalize_appends_suffix() {
        assert_eq!(b3_catalog().normalize("PETR4"), "PETR4.SA");
    }
}

// ═══════════════════════════════════════════════════════════════════
// SelectionService
// ═══════════════════════════════════════════════════════════════════

mod selection_service {
    use super::*;

    #[test]
    fn full_range_all_tickers_is_identity() {
        let t = example_table();
        let out = SelectionService::new()
            .filter(&t, &Selection::all(d(2024, 1, 1), d(2024, 1, 3)).unwrap())
            .unwrap();
        assert_eq!(out, t);
    }

    #[test]
    fn single_day_gives_one_row() {
        let out = SelectionService::new()
            .filter(&example_table(), &select(&["A", "B"], d(2024, 1, 2), d(2024, 1, 2)))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.column("A").unwrap().values, vec![Some(12.0)]);
    }

    #[test]
    fn single_ticker_is_still_a_table() {
        let out = SelectionService::new()
            .filter(&example_table(), &select(&["B"], d(2024, 1, 1), d(2024, 1, 3)))
            .unwrap();
        assert_eq!(out.symbols(), vec!["B"]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn unknown_ticker_fails() {
        let err = SelectionService::new()
            .filter(&example_table(), &select(&["A", "Z"], d(2024, 1, 1), d(2024, 1, 3)))
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownTicker(ref s) if s == "Z"));
    }

    #[test]
    fn range_without_rows_fails() {
        let err = SelectionService::new()
            .filter(&example_table(), &select(&["A"], d(2025, 1, 1), d(2025, 2, 1)))
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyRange { .. }));
    }

    #[test]
    fn inverted_range_fails_before_filtering() {
        let sel = Selection {
            tickers: vec!["A".into()],
            start: d(2024, 1, 3),
            end: d(2024, 1, 1),
        };
        let err = SelectionService::new().filter(&example_table(), &sel).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }
}

// ═══════════════════════════════════════════════════════════════════
// AnalyticsService
// ═══════════════════════════════════════════════════════════════════

mod analytics_service {
    use super::*;

    #[test]
    fn asset_return_and_mean() {
        let a = AnalyticsService::new()
            .asset_performance(&example_table(), "A")
            .unwrap();
        assert_eq!(a.initial_price, 10.0);
        assert_eq!(a.final_price, 9.0);
        assert!((a.return_fraction - (-0.1)).abs() < 1e-12);
        assert!((a.mean_price - 31.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.observations, 3);
        assert_eq!(a.start_date, d(2024, 1, 1));
        assert_eq!(a.end_date, d(2024, 1, 3));
    }

    #[test]
    fn equal_weight_portfolio_offsets() {
        let p = AnalyticsService::new()
            .portfolio_performance(&example_table(), &["A", "B"], 1000.0)
            .unwrap();
        assert!((p.assets[1].return_fraction - 0.1).abs() < 1e-12);
        assert!((p.initial_value - 2000.0).abs() < 1e-9);
        assert!((p.final_value - 2000.0).abs() < 1e-9);
        assert!(p.return_fraction.abs() < 1e-12);
    }

    #[test]
    fn uniform_returns_give_same_portfolio_return() {
        let t = TimeSeriesTable::from_series(vec![
            series("X", &[(d(2024, 1, 1), 50.0), (d(2024, 1, 2), 55.0)]),
            series("Y", &[(d(2024, 1, 1), 4.0), (d(2024, 1, 2), 4.4)]),
            series("Z", &[(d(2024, 1, 1), 100.0), (d(2024, 1, 2), 110.0)]),
        ]);
        let p = AnalyticsService::new()
            .portfolio_performance(&t, &["X", "Y", "Z"], 1000.0)
            .unwrap();
        assert!((p.return_fraction - 0.1).abs() < 1e-12);
    }

    #[test]
    fn single_row_has_zero_return() {
        let t = example_table().slice_dates(d(2024, 1, 2), d(2024, 1, 2));
        let a = AnalyticsService::new().asset_performance(&t, "A").unwrap();
        assert_eq!(a.return_fraction, 0.0);
        assert_eq!(a.mean_price, 12.0);
    }

    #[test]
    fn gaps_use_first_and_last_present_values() {
        let t = TimeSeriesTable::from_series(vec![
            series("A", &[(d(2024, 1, 2), 10.0), (d(2024, 1, 3), 15.0)]),
            series("B", &[(d(2024, 1, 1), 1.0), (d(2024, 1, 4), 2.0)]),
        ]);
        let a = AnalyticsService::new().asset_performance(&t, "A").unwrap();
        assert_eq!(a.start_date, d(2024, 1, 2));
        assert_eq!(a.end_date, d(2024, 1, 3));
        assert!((a.return_fraction - 0.5).abs() < 1e-12);
        assert_eq!(a.observations, 2);
    }

    #[test]
    fn empty_selection_is_an_error() {
        let tickers: [&str; 0] = [];
        let err = AnalyticsService::new()
            .portfolio_performance(&example_table(), &tickers, 1000.0)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptySelection));
    }

    #[test]
    fn zero_base_price_is_an_error() {
        let t = TimeSeriesTable::from_series(vec![series(
            "Z",
            &[(d(2024, 1, 1), 0.0), (d(2024, 1, 2), 5.0)],
        )]);
        let err = AnalyticsService::new().asset_performance(&t, "Z").unwrap_err();
        assert!(matches!(err, CoreError::ZeroBasePrice(ref s) if s == "Z"));
    }

    #[test]
    fn column_without_values_is_an_error() {
        let t = TimeSeriesTable::from_series(vec![
            series("A", &[(d(2024, 1, 1), 1.0), (d(2024, 1, 5), 2.0)]),
            series("B", &[(d(2024, 1, 5), 3.0)]),
        ])
        .slice_dates(d(2024, 1, 1), d(2024, 1, 1));
        let err = AnalyticsService::new().asset_performance(&t, "B").unwrap_err();
        assert!(matches!(err, CoreError::NoPriceData(ref s) if s == "B"));
    }

    #[test]
    fn unknown_ticker_is_an_error() {
        let err = AnalyticsService::new()
            .asset_performance(&example_table(), "Q")
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownTicker(_)));
    }

    #[test]
    fn invalid_unit_investment_is_rejected() {
        let err = AnalyticsService::new()
            .portfolio_performance(&example_table(), &["A"], 0.0)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn assets_follow_selection_order() {
        let p = AnalyticsService::new()
            .portfolio_performance(&example_table(), &["B", "A"], 1000.0)
            .unwrap();
        let order: Vec<_> = p.assets.iter().map(|a| a.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// MarketDataService — with mock provider
// ═══════════════════════════════════════════════════════════════════

mod market_data_service {
    use super::*;

    #[test]
    fn fetch_key_ignores_order_and_duplicates() {
        let a = FetchKey::new(&["B", "A", "B"], d(2024, 1, 1), d(2024, 1, 2));
        let b = FetchKey::new(&["A", "B"], d(2024, 1, 1), d(2024, 1, 2));
        assert_eq!(a, b);
        assert_eq!(a.symbols, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn builds_price_and_volume_tables() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(true)));
        let data = svc
            .fetch(&["PETR4.SA", "VALE3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();

        assert_eq!(data.prices.symbols(), vec!["PETR4.SA", "VALE3.SA"]);
        assert_eq!(data.prices.len(), 3);
        let volume = data.volume.as_ref().unwrap();
        assert_eq!(
            volume.column("PETR4.SA").unwrap().values,
            vec![Some(1000.0), Some(1500.0), Some(800.0)]
        );
        assert!(data.missing.is_empty());
    }

    #[tokio::test]
    async fn second_fetch_hits_cache() {
        let provider = MockMarketProvider::new(true);
        let calls = provider.call_counter();
        let mut svc = MarketDataService::new(registry_with(provider));

        let first = svc
            .fetch(&["PETR4.SA", "VALE3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Same set, different order: served from cache
        let second = svc
            .fetch(&["VALE3.SA", "PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(svc.cached_entries(), 1);
    }

    #[tokio::test]
    async fn different_window_is_a_new_entry() {
        let provider = MockMarketProvider::new(true);
        let calls = provider.call_counter();
        let mut svc = MarketDataService::new(registry_with(provider));

        svc.fetch(&["PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31)).await.unwrap();
        let narrow = svc
            .fetch(&["PETR4.SA"], d(2024, 1, 3), d(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(svc.cached_entries(), 2);
        assert_eq!(narrow.prices.len(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let provider = MockMarketProvider::new(true);
        let calls = provider.call_counter();
        let mut svc = MarketDataService::new(registry_with(provider));

        svc.fetch(&["PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31)).await.unwrap();
        svc.invalidate();
        assert_eq!(svc.cached_entries(), 0);
        svc.fetch(&["PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_volume_is_not_an_error() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(false)));
        assert!(!svc.volume_supported());
        let data = svc
            .fetch(&["PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert!(data.volume.is_none());
        assert_eq!(data.prices.len(), 3);
    }

    #[tokio::test]
    async fn volume_is_ignored_when_no_provider_declares_it() {
        let mut provider = MockMarketProvider::new(true);
        provider.with_volume = false;
        let mut svc = MarketDataService::new(registry_with(provider));
        assert!(!svc.volume_supported());
        let data = svc
            .fetch(&["PETR4.SA", "VALE3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert!(data.volume.is_none());
        assert_eq!(data.prices.columns().len(), 2);
    }

    #[tokio::test]
    async fn unknown_symbol_is_reported_missing() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(true)));
        let data = svc
            .fetch(&["PETR4.SA", "XPTO3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(data.prices.symbols(), vec!["PETR4.SA"]);
        assert_eq!(data.missing, vec!["XPTO3.SA"]);
    }

    #[tokio::test]
    async fn no_rows_in_window_is_an_error() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(true)));
        let err = svc
            .fetch(&["PETR4.SA"], d(2023, 1, 1), d(2023, 12, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProviderFetch { .. }));
    }

    #[tokio::test]
    async fn all_symbols_failing_returns_error() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(true)));
        let err = svc
            .fetch(&["AAAA3.SA", "BBBB3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProviderFetch { ref message, .. } if message.contains("BBBB3.SA")));
        assert_eq!(svc.cached_entries(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_next_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(FailingProvider));
        registry.register(Box::new(MockMarketProvider::new(true)));
        let mut svc = MarketDataService::new(registry);

        let data = svc
            .fetch(&["VALE3.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(data.prices.symbols(), vec!["VALE3.SA"]);
        assert_eq!(svc.provider_names(), vec!["Failing", "MockMarket"]);
    }

    #[tokio::test]
    async fn empty_registry_fails() {
        let mut svc = MarketDataService::new(ProviderRegistry::new());
        let err = svc
            .fetch(&["PETR4.SA"], d(2024, 1, 1), d(2024, 1, 31))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoProvider));
    }

    #[tokio::test]
    async fn inverted_window_fails() {
        let mut svc = MarketDataService::new(registry_with(MockMarketProvider::new(true)));
        let err = svc
            .fetch(&["PETR4.SA"], d(2024, 2, 1), d(2024, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn invalid_closes_are_dropped() {
        let quotes = vec![
            DailyQuote { date: d(2024, 1, 2), close: 10.0, volume: Some(1.0) },
            DailyQuote { date: d(2024, 1, 3), close: f64::NAN, volume: Some(1.0) },
            DailyQuote { date: d(2024, 1, 4), close: 11.0, volume: Some(1.0) },
        ];
        let mut svc =
            MarketDataService::new(registry_with(MockMarketProvider::with_quotes("A", quotes)));
        let data = svc.fetch(&["A"], d(2024, 1, 1), d(2024, 1, 31)).await.unwrap();
        assert_eq!(data.prices.index(), &[d(2024, 1, 2), d(2024, 1, 4)]);
    }

    #[tokio::test]
    async fn partial_volume_leaves_column_out() {
        let quotes = vec![
            DailyQuote { date: d(2024, 1, 2), close: 10.0, volume: Some(5.0) },
            DailyQuote { date: d(2024, 1, 3), close: 11.0, volume: None },
        ];
        let mut svc =
            MarketDataService::new(registry_with(MockMarketProvider::with_quotes("A", quotes)));
        let data = svc.fetch(&["A"], d(2024, 1, 1), d(2024, 1, 31)).await.unwrap();
        assert_eq!(data.prices.len(), 2);
        assert!(data.volume.is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// ChartService
// ═══════════════════════════════════════════════════════════════════

mod chart_service {
    use super::*;

    #[test]
    fn one_series_per_column() {
        let chart = ChartService::new().price_chart(&example_table(), ChartStyle::Line);
        assert_eq!(chart.title, PRICE_CHART_TITLE);
        assert_eq!(chart.style, ChartStyle::Line);
        let labels: Vec<_> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(chart.series[0].points.len(), 3);
    }

    #[test]
    fn price_chart_honours_style() {
        let chart = ChartService::new().price_chart(&example_table(), ChartStyle::Area);
        assert_eq!(chart.style, ChartStyle::Area);
    }

    #[test]
    fn missing_cells_are_not_plotted() {
        let t = TimeSeriesTable::from_series(vec![
            series("A", &[(d(2024, 1, 1), 1.0)]),
            series("B", &[(d(2024, 1, 2), 2.0)]),
        ]);
        let chart = ChartService::new().price_chart(&t, ChartStyle::Line);
        assert_eq!(chart.series[0].points.len(), 1);
        assert_eq!(chart.series[1].points[0].date, d(2024, 1, 2));
    }

    #[test]
    fn volume_chart_is_always_area() {
        let chart = ChartService::new().volume_chart(&example_table());
        assert_eq!(chart.title, VOLUME_CHART_TITLE);
        assert_eq!(chart.style, ChartStyle::Area);
    }
}
