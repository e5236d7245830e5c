use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::settings::DashboardSettings;

/// Loads the ticker universe from the reference dataset.
///
/// Pure parsing. The only I/O is reading the file. Order is preserved and
/// duplicates are kept as they appear in the source.
pub struct CatalogService {
    delimiter: u8,
    code_column: String,
    suffix: String,
}

impl CatalogService {
    pub fn new(delimiter: u8, code_column: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            delimiter,
            code_column: code_column.into(),
            suffix: suffix.into(),
        }
    }

    pub fn from_settings(settings: &DashboardSettings) -> Self {
        Self::new(
            settings.catalog_delimiter as u8,
            settings.code_column.clone(),
            settings.market_suffix.clone(),
        )
    }

    /// Append the market suffix to a raw code ("PETR4" → "PETR4.SA").
    pub fn normalize(&self, code: &str) -> String {
        format!("{}{}", code.trim(), self.suffix)
    }

    /// Load the catalog from a file on disk.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<String>, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::CatalogLoad(format!("cannot read {}: {e}", path.display())))?;
        let symbols = self.parse(&bytes)?;
        info!("Loaded {} tickers from {}", symbols.len(), path.display());
        Ok(symbols)
    }

    /// Load the catalog from any reader (used by tests and in-memory data).
    pub fn load_from_reader<R: Read>(&self, mut reader: R) -> Result<Vec<String>, CoreError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| CoreError::CatalogLoad(e.to_string()))?;
        self.parse(&bytes)
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<String>, CoreError> {
        let text = decode_text(bytes);
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = rdr.headers()?.clone();
        let code_idx = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == self.code_column)
            .ok_or_else(|| {
                CoreError::CatalogLoad(format!("missing required column '{}'", self.code_column))
            })?;

        let mut symbols = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            match record.get(code_idx).map(str::trim) {
                Some(code) if !code.is_empty() => symbols.push(self.normalize(code)),
                _ => warn!("Skipping catalog row {} with an empty '{}'", row + 2, self.code_column),
            }
        }

        Ok(symbols)
    }
}

/// Decode as UTF-8, falling back to Latin-1 (B3 exports use it).
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
