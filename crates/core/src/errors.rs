use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the entire ibov-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Reference dataset / configuration ───────────────────────────
    #[error("Failed to load ticker catalog: {0}")]
    CatalogLoad(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Market data / Network ───────────────────────────────────────
    #[error("Price fetch failed ({provider}): {message}")]
    ProviderFetch {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No market data provider registered")]
    NoProvider,

    // ── Tables & selection ──────────────────────────────────────────
    #[error("Invalid price table: {0}")]
    InvalidTable(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No prices between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    // ── Analytics ───────────────────────────────────────────────────
    #[error("No tickers selected; nothing to compute")]
    EmptySelection,

    #[error("Initial price of {0} is zero; return is undefined")]
    ZeroBasePrice(String),

    #[error("No price data for {0} in the selected range")]
    NoPriceData(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::CatalogLoad(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, API key included.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
