use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// What the user picked: tickers plus a closed date interval.
///
/// An empty `tickers` list means "every column" to the selection filter.
/// The analyzer and the dashboard never read it that way: see
/// [`crate::StockDashboard::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub tickers: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    /// Build a validated selection. Repeated tickers keep their first position.
    pub fn new(tickers: Vec<String>, start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        let mut unique: Vec<String> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if !unique.contains(&ticker) {
                unique.push(ticker);
            }
        }
        let selection = Self {
            tickers: unique,
            start,
            end,
        };
        selection.validate()?;
        Ok(selection)
    }

    /// Every column over `[start, end]`.
    pub fn all(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        Self::new(Vec::new(), start, end)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.start > self.end {
            return Err(CoreError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Largest accepted slider step, one hundred years.
pub const MAX_STEP_DAYS: i64 = 36_500;

/// Date-range control with a fixed step.
///
/// Stops are `min, min + step, min + 2·step, …` and `max` itself is always a
/// stop, so the full range stays selectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSlider {
    pub min: NaiveDate,
    pub max: NaiveDate,
    pub step_days: i64,
}

impl RangeSlider {
    pub fn new(min: NaiveDate, max: NaiveDate, step_days: i64) -> Result<Self, CoreError> {
        if min > max {
            return Err(CoreError::InvalidDateRange { start: min, end: max });
        }
        if step_days <= 0 || step_days > MAX_STEP_DAYS {
            return Err(CoreError::Validation(format!(
                "slider step must be between 1 and {MAX_STEP_DAYS} days, got {step_days}"
            )));
        }
        Ok(Self { min, max, step_days })
    }

    /// All reachable positions, ascending.
    pub fn stops(&self) -> Vec<NaiveDate> {
        let step = TimeDelta::try_days(self.step_days.max(1));
        let mut stops = Vec::new();
        let mut next = Some(self.min);
        while let Some(d) = next.filter(|d| *d < self.max) {
            stops.push(d);
            next = step.and_then(|s| d.checked_add_signed(s));
        }
        stops.push(self.max);
        stops
    }

    /// The stop closest to `date`; ties go to the earlier stop.
    pub fn snap(&self, date: NaiveDate) -> NaiveDate {
        if date <= self.min {
            return self.min;
        }
        if date >= self.max {
            return self.max;
        }
        let step = self.step_days.max(1);
        let offset = (date - self.min).num_days();
        let below = TimeDelta::try_days(offset / step * step)
            .and_then(|delta| self.min.checked_add_signed(delta))
            .unwrap_or(self.min);
        // Past the end of the calendar counts as past `max`.
        let above = TimeDelta::try_days(step)
            .and_then(|delta| below.checked_add_signed(delta))
            .map_or(self.max, |d| d.min(self.max));
        if (date - below) <= (above - date) {
            below
        } else {
            above
        }
    }

    /// Snap both ends of a range. The order is kept, so an inverted range
    /// stays inverted and [`Selection::new`] rejects it.
    pub fn snap_range(&self, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (self.snap(start), self.snap(end))
    }
}
