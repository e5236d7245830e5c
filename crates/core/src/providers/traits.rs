use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::price::DailyQuote;

/// Trait abstraction for all market data providers.
///
/// Each API (Yahoo Finance, Alpha Vantage) implements this trait. If an API
/// stops working or changes, only that one implementation is replaced.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Whether returned quotes carry traded volume.
    fn supports_volume(&self) -> bool;

    /// Daily close (and volume, when supported) for `symbol` over the closed
    /// interval `[from, to]`. Returns quotes sorted by date; an empty Vec
    /// means the symbol has no data in that window.
    async fn get_daily_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, CoreError>;
}
