use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use super::price::{PricePoint, PriceSeries};

/// One ticker's values aligned to the table's shared date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub symbol: String,
    /// `None` where the ticker has no value on that row.
    pub values: Vec<Option<f64>>,
}

/// A date-indexed table with one column per ticker.
///
/// All columns share `index`, which is strictly increasing. Column order is
/// insertion order and columns are always keyed by ticker symbol, even when
/// the table holds a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

/// Close prices per ticker.
pub type PriceTable = TimeSeriesTable;

/// Traded volume per ticker.
pub type VolumeTable = TimeSeriesTable;

impl TimeSeriesTable {
    /// A table with no rows and no columns.
    pub fn empty() -> Self {
        Self {
            index: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Build a table from an explicit index and columns.
    ///
    /// Fails if the index is not strictly increasing, a column length does not
    /// match the index, a symbol appears twice, or a value is not finite.
    pub fn from_columns(index: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, CoreError> {
        if let Some(pair) = index.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CoreError::InvalidTable(format!(
                "date index is not strictly increasing at {} → {}",
                pair[0], pair[1]
            )));
        }

        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.values.len() != index.len() {
                return Err(CoreError::InvalidTable(format!(
                    "column {} has {} values for {} dates",
                    column.symbol,
                    column.values.len(),
                    index.len()
                )));
            }
            if !seen.insert(column.symbol.as_str()) {
                return Err(CoreError::InvalidTable(format!(
                    "duplicate column {}",
                    column.symbol
                )));
            }
            if column.values.iter().flatten().any(|v| !v.is_finite()) {
                return Err(CoreError::InvalidTable(format!(
                    "column {} contains a non-finite value",
                    column.symbol
                )));
            }
        }

        Ok(Self { index, columns })
    }

    /// Align several series on the union of their dates.
    ///
    /// A ticker with no value on some date of the union gets `None` there.
    /// Empty series are dropped, so the resulting columns may be a subset of
    /// the input.
    pub fn from_series(series: Vec<PriceSeries>) -> Self {
        let index: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = series
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                let mut values = vec![None; index.len()];
                for point in &s.points {
                    if let Ok(row) = index.binary_search(&point.date) {
                        values[row] = Some(point.price);
                    }
                }
                Column {
                    symbol: s.symbol,
                    values,
                }
            })
            .collect();

        Self { index, columns }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.symbol.as_str()).collect()
    }

    pub fn has_column(&self, symbol: &str) -> bool {
        self.column(symbol).is_some()
    }

    pub fn column(&self, symbol: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.index.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.index.last().copied()
    }

    /// The present values of one column as a series (rows with `None` skipped).
    pub fn series(&self, symbol: &str) -> Option<PriceSeries> {
        let column = self.column(symbol)?;
        let points = self
            .index
            .iter()
            .zip(&column.values)
            .filter_map(|(date, value)| value.map(|price| PricePoint { date: *date, price }))
            .collect();
        Some(PriceSeries {
            symbol: column.symbol.clone(),
            points,
        })
    }

    /// Keep exactly the named columns, in the given order.
    pub fn select_columns<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Self, CoreError> {
        let columns = symbols
            .iter()
            .map(|s| {
                self.column(s.as_ref())
                    .cloned()
                    .ok_or_else(|| CoreError::UnknownTicker(s.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            index: self.index.clone(),
            columns,
        })
    }

    /// Keep rows whose date lies in the closed interval `[start, end]`.
    /// Uses binary search on the index for both bounds.
    pub fn slice_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let lo = self.index.partition_point(|d| *d < start);
        let hi = self.index.partition_point(|d| *d <= end).max(lo);
        Self {
            index: self.index[lo..hi].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    symbol: c.symbol.clone(),
                    values: c.values[lo..hi].to_vec(),
                })
                .collect(),
        }
    }
}

impl Default for TimeSeriesTable {
    fn default() -> Self {
        Self::empty()
    }
}
