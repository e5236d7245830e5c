use crate::models::chart::{Chart, ChartPoint, ChartSeries, ChartStyle};
use crate::models::table::TimeSeriesTable;

pub const PRICE_CHART_TITLE: &str = "Stock price evolution";
pub const VOLUME_CHART_TITLE: &str = "Traded volume";

/// Generates chart-ready data sets from tables, so the frontend only renders.
///
/// There is one series per column, labelled with the ticker. Missing cells
/// are left out of the series rather than drawn as zero.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Close prices in the user's chosen style.
    pub fn price_chart(&self, prices: &TimeSeriesTable, style: ChartStyle) -> Chart {
        self.build(prices, style, PRICE_CHART_TITLE)
    }

    /// Volume is always drawn as an area chart.
    pub fn volume_chart(&self, volume: &TimeSeriesTable) -> Chart {
        self.build(volume, ChartStyle::Area, VOLUME_CHART_TITLE)
    }

    fn build(&self, table: &TimeSeriesTable, style: ChartStyle, title: &str) -> Chart {
        let series = table
            .columns()
            .iter()
            .map(|column| ChartSeries {
                label: column.symbol.clone(),
                points: table
                    .index()
                    .iter()
                    .zip(&column.values)
                    .filter_map(|(date, value)| {
                        value.map(|v| ChartPoint {
                            date: *date,
                            value: v,
                        })
                    })
                    .collect(),
            })
            .collect();

        Chart {
            title: title.to_string(),
            style,
            series,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
