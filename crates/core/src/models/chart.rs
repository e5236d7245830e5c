use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// How a chart is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    /// Plain lines
    #[default]
    Line,
    /// Lines filled down to zero
    Area,
}

impl std::fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartStyle::Line => write!(f, "line"),
            ChartStyle::Area => write!(f, "area"),
        }
    }
}

impl std::str::FromStr for ChartStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartStyle::Line),
            "area" => Ok(ChartStyle::Area),
            other => Err(CoreError::Validation(format!(
                "unknown chart style '{other}' (expected line or area)"
            ))),
        }
    }
}

/// A chart ready for rendering.
///
/// The renderer only draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub style: ChartStyle,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    /// Smallest and largest value across all series, if any.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.value))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Earliest and latest date across all series, if any.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.series.iter().filter_map(|s| s.points.first()).map(|p| p.date).min()?;
        let last = self.series.iter().filter_map(|s| s.points.last()).map(|p| p.date).max()?;
        Some((first, last))
    }
}

/// One line (or filled area) of a chart, labelled by ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}
