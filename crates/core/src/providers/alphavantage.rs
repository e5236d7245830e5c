use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::price::DailyQuote;
use super::traits::MarketDataProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

/// Alpha Vantage provider for daily equity history.
///
/// - **Requires**: API key (set via settings as "alphavantage").
/// - **Free tier**: 25 requests/day, so it is only registered as a fallback.
/// - **Coverage**: B3 symbols use the same `.SA` suffix as Yahoo.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, api_key }
    }

    /// Parse the "Time Series (Daily)" map into sorted quotes within `[from, to]`.
    /// Entries with an unparsable date or close are skipped.
    fn parse_series(
        time_series: &HashMap<String, DailyData>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<DailyQuote> {
        let mut points: Vec<DailyQuote> = time_series
            .iter()
            .filter_map(|(date_str, data)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                if date < from || date > to {
                    return None;
                }
                let close: f64 = data.close.parse().ok()?;
                let volume = data.volume.as_deref().and_then(|v| v.parse::<f64>().ok());
                Some(DailyQuote { date, close, volume })
            })
            .collect();

        points.sort_by_key(|p| p.date);
        points
    }
}

// ── Alpha Vantage API response types ────────────────────────────────

#[derive(Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyData>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
}

#[derive(Deserialize)]
struct DailyData {
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: Option<String>,
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
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
        let resp: TimeSeriesResponse = self
            .client
            .get(BASE_URL)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", &symbol.to_uppercase()),
                ("outputsize", "full"),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::ProviderFetch {
                provider: PROVIDER.into(),
                message: format!("Failed to parse time series for {symbol}: {e}"),
            })?;

        if let Some(message) = resp.error_message.or(resp.note) {
            return Err(CoreError::ProviderFetch {
                provider: PROVIDER.into(),
                message: format!("{symbol}: {message}"),
            });
        }

        let time_series = resp.time_series.ok_or_else(|| CoreError::ProviderFetch {
            provider: PROVIDER.into(),
            message: format!("No time series data for {symbol}. API limit may be exceeded."),
        })?;

        Ok(Self::parse_series(&time_series, from, to))
    }
}
