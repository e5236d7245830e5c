use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::price::{DailyQuote, PricePoint, PriceSeries};
use crate::models::table::TimeSeriesTable;
use crate::models::view::MarketData;
use crate::providers::registry::ProviderRegistry;
use crate::providers::traits::MarketDataProvider;

/// Cache key: sorted, de-duplicated symbols plus the requested window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub symbols: Vec<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FetchKey {
    pub fn new<S: AsRef<str>>(symbols: &[S], from: NaiveDate, to: NaiveDate) -> Self {
        let mut symbols: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        symbols.sort();
        symbols.dedup();
        Self { symbols, from, to }
    }
}

/// Fetches price tables from providers and memoizes them.
///
/// Cache strategy:
/// - One entry per distinct (symbol set, window). The key is order
///   independent, so `[A, B]` and `[B, A]` share an entry.
/// - Entries never expire. The key space is small (one catalog, one window),
///   so an unbounded map is fine; `invalidate()` drops everything when the
///   reference dataset changes.
/// - Cached tables are immutable and shared behind an `Arc`.
pub struct MarketDataService {
    registry: ProviderRegistry,
    cache: HashMap<FetchKey, Arc<MarketData>>,
}

impl MarketDataService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
        }
    }

    /// Names of the registered providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Whether any provider can supply volume at all.
    pub fn volume_supported(&self) -> bool {
        self.registry.any_supports_volume()
    }

    /// Get the tables for `symbols` over `[from, to]`.
    ///
    /// 1. Check cache → return if found.
    /// 2. If not cached: fetch every symbol → build tables → store → return.
    pub async fn fetch<S: AsRef<str>>(
        &mut self,
        symbols: &[S],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Arc<MarketData>, CoreError> {
        if from > to {
            return Err(CoreError::InvalidDateRange { start: from, end: to });
        }
        let key = FetchKey::new(symbols, from, to);

        if let Some(hit) = self.cache.get(&key) {
            debug!("Market data cache hit for {} symbols", key.symbols.len());
            return Ok(Arc::clone(hit));
        }

        // Request order is kept for the table's column order.
        let mut ordered: Vec<&str> = Vec::with_capacity(key.symbols.len());
        for symbol in symbols.iter().map(|s| s.as_ref()) {
            if !ordered.contains(&symbol) {
                ordered.push(symbol);
            }
        }

        let data = Arc::new(self.fetch_uncached(&ordered, from, to).await?);
        self.cache.insert(key, Arc::clone(&data));
        Ok(data)
    }

    /// Number of memoized fetches.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Drop all memoized tables (e.g. after the reference dataset changed).
    pub fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            info!("Invalidating {} cached market data entries", self.cache.len());
        }
        self.cache.clear();
    }

    /// Fetch every symbol and align the results into tables.
    ///
    /// A symbol for which every provider fails or returns nothing is left out
    /// and reported in `MarketData::missing`. Only when no symbol at all has
    /// data is the last provider error returned.
    async fn fetch_uncached(
        &self,
        symbols: &[&str],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<MarketData, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        info!("Fetching daily history for {} symbols ({from} → {to})", symbols.len());

        let mut price_series = Vec::with_capacity(symbols.len());
        let mut volume_series = Vec::with_capacity(symbols.len());
        let mut missing = Vec::new();
        let mut any_volume = false;
        let mut last_error = None;
        let want_volume = self.volume_supported();
        if !want_volume {
            debug!("No registered provider supplies volume; building prices only");
        }

        for &symbol in symbols {
            match Self::fetch_symbol(&providers, symbol, from, to).await {
                Ok(quotes) if !quotes.is_empty() => {
                    let (prices, volume) = split_quotes(symbol, &quotes);
                    if let Some(volume) = volume.filter(|_| want_volume) {
                        any_volume = true;
                        volume_series.push(volume);
                    }
                    price_series.push(prices);
                }
                Ok(_) => {
                    warn!("No data for {symbol} between {from} and {to}; omitting it");
                    missing.push(symbol.to_string());
                }
                Err(e) => {
                    warn!("Omitting {symbol}: {e}");
                    missing.push(symbol.to_string());
                    last_error = Some(e);
                }
            }
        }

        if price_series.is_empty() {
            return Err(last_error.unwrap_or_else(|| CoreError::ProviderFetch {
                provider: providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(", "),
                message: format!("no data for any of {} symbols", symbols.len()),
            }));
        }

        let prices = TimeSeriesTable::from_series(price_series);
        let volume = any_volume.then(|| TimeSeriesTable::from_series(volume_series));

        info!(
            "Built price table: {} rows × {} tickers (volume {})",
            prices.len(),
            prices.columns().len(),
            if volume.is_some() { "available" } else { "not available" }
        );

        Ok(MarketData {
            prices,
            volume,
            missing,
        })
    }

    /// Try providers in registration order until one returns quotes.
    async fn fetch_symbol(
        providers: &[&dyn MarketDataProvider],
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, CoreError> {
        let mut last_error = None;

        for provider in providers {
            match provider.get_daily_history(symbol, from, to).await {
                Ok(quotes) => {
                    let valid = sanitize_quotes(provider.name(), symbol, quotes);
                    if !valid.is_empty() {
                        return Ok(valid);
                    }
                    debug!("{} returned no data for {symbol}", provider.name());
                }
                Err(e) => {
                    debug!("{} failed for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

/// Drop quotes with a non-finite or negative close; sort by date.
fn sanitize_quotes(provider: &str, symbol: &str, mut quotes: Vec<DailyQuote>) -> Vec<DailyQuote> {
    let before = quotes.len();
    quotes.retain(|q| q.close.is_finite() && q.close >= 0.0);
    if quotes.len() < before {
        warn!(
            "{provider} returned {} invalid prices for {symbol}; dropped",
            before - quotes.len()
        );
    }
    quotes.sort_by_key(|q| q.date);
    quotes
}

/// Split quotes into a price series and, if every quote carries a finite
/// volume, a volume series.
fn split_quotes(symbol: &str, quotes: &[DailyQuote]) -> (PriceSeries, Option<PriceSeries>) {
    let prices = PriceSeries::new(
        symbol,
        quotes
            .iter()
            .map(|q| PricePoint {
                date: q.date,
                price: q.close,
            })
            .collect(),
    );

    let volume: Option<Vec<PricePoint>> = quotes
        .iter()
        .map(|q| {
            q.volume
                .filter(|v| v.is_finite())
                .map(|v| PricePoint { date: q.date, price: v })
        })
        .collect();

    (prices, volume.map(|points| PriceSeries::new(symbol, points)))
}
