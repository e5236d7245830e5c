use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::price::DailyQuote;
use super::traits::MarketDataProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for daily equity history.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities including B3 (`PETR4.SA`, `VALE3.SA`, ...).
/// - **Data**: Full daily OHLCV; the split- and dividend-adjusted close and
///   the volume are kept.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// chart endpoint.
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| {
            CoreError::ProviderFetch {
                provider: PROVIDER.into(),
                message: format!("Failed to create connector: {e}"),
            }
        })?;
        Ok(Self { connector })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let invalid = |e: &dyn std::fmt::Display| CoreError::ProviderFetch {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        };
        let month = time::Month::try_from(date.month() as u8).map_err(|e| invalid(&e))?;
        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| invalid(&e))?
            .with_hms(0, 0, 0)
            .map_err(|e| invalid(&e))?
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    /// Map one Yahoo bar to a daily quote priced at the adjusted close.
    ///
    /// Yahoo reports a missing adjusted close as zero; the raw close is used
    /// for such bars.
    fn to_daily_quote(q: &yahoo_finance_api::Quote) -> Option<DailyQuote> {
        let date = Self::timestamp_to_naive_date(q.timestamp as i64)?;
        let close = if q.adjclose.is_finite() && q.adjclose > 0.0 {
            q.adjclose
        } else {
            q.close
        };
        Some(DailyQuote {
            date,
            close,
            volume: Some(q.volume as f64),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supports_volume(&self) -> bool {
        true
    }

    async fn get_daily_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        // inclusive end
        let end = Self::to_offset_datetime(to.succ_opt().unwrap_or(to))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::ProviderFetch {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::ProviderFetch {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let mut points: Vec<DailyQuote> = quotes
            .iter()
            .filter_map(Self::to_daily_quote)
            .filter(|p| p.date >= from && p.date <= to)
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
