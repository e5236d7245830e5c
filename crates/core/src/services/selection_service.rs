use crate::errors::CoreError;
use crate::models::selection::Selection;
use crate::models::table::TimeSeriesTable;

/// Narrows a table to the user's tickers and date interval.
///
/// Pure business logic, no I/O. Columns stay keyed by ticker symbol no
/// matter how many are selected.
pub struct SelectionService;

impl SelectionService {
    pub fn new() -> Self {
        Self
    }

    /// Apply a selection to a table.
    ///
    /// - Empty `selection.tickers`: every column is kept.
    /// - Otherwise exactly the named columns, in selection order
    ///   (`UnknownTicker` if one is missing).
    /// - Rows restricted to `[start, end]`, both ends inclusive
    ///   (`EmptyRange` if nothing is left).
    pub fn filter(
        &self,
        table: &TimeSeriesTable,
        selection: &Selection,
    ) -> Result<TimeSeriesTable, CoreError> {
        selection.validate()?;

        let narrowed = if selection.tickers.is_empty() {
            table.slice_dates(selection.start, selection.end)
        } else {
            table
                .select_columns(&selection.tickers)?
                .slice_dates(selection.start, selection.end)
        };

        if narrowed.is_empty() {
            return Err(CoreError::EmptyRange {
                start: selection.start,
                end: selection.end,
            });
        }

        Ok(narrowed)
    }
}

impl Default for SelectionService {
    fn default() -> Self {
        Self::new()
    }
}
