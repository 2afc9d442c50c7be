//! View Model Module
//! Turns the canonical table and a selection into everything the window draws.

use crate::config::DashboardConfig;
use crate::data::{
    filter, CanonicalTable, CategoryColumn, Distribution, Selection, TrendPoint,
};
use std::sync::Arc;

/// Shown in place of the line chart when nothing matches.
pub const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

pub const DASHBOARD_TITLE: &str = "India Air Quality Data Dashboard";
pub const STATE_CHART_TITLE: &str = "State Distribution";
pub const TYPE_CHART_TITLE: &str = "Type Distribution";

/// Tabular part of the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// SO2/NO2 line chart data.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendChart {
    pub title: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendPanel {
    Chart(TrendChart),
    NoData(&'static str),
}

/// Everything one render pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub caption: String,
    pub table: DisplayTable,
    pub state_distribution: Distribution,
    pub type_distribution: Distribution,
    pub trend: TrendPanel,
}

impl ViewModel {
    pub fn has_data(&self) -> bool {
        matches!(self.trend, TrendPanel::Chart(_))
    }
}

/// The loaded table plus the selection-independent distributions.
pub struct Dashboard {
    table: Arc<CanonicalTable>,
    state_distribution: Distribution,
    type_distribution: Distribution,
}

impl Dashboard {
    pub fn new(table: Arc<CanonicalTable>, config: &DashboardConfig) -> Self {
        // Pie charts always describe the full table
        let state_distribution =
            Distribution::aggregated(&table, CategoryColumn::State, config.state_threshold);
        let type_distribution =
            Distribution::aggregated(&table, CategoryColumn::Type, config.type_threshold);

        Self {
            table,
            state_distribution,
            type_distribution,
        }
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.table
    }

    /// Build the view for `selection`. Pure: same inputs, same output.
    pub fn render(&self, selection: &Selection) -> ViewModel {
        let view = filter(&self.table, selection);
        let (headers, rows) = view.display_table();

        let trend = if view.is_empty() {
            TrendPanel::NoData(NO_DATA_MESSAGE)
        } else {
            TrendPanel::Chart(TrendChart {
                title: trend_title(selection),
                points: view.trend(),
            })
        };

        ViewModel {
            caption: caption(selection),
            table: DisplayTable { headers, rows },
            state_distribution: self.state_distribution.clone(),
            type_distribution: self.type_distribution.clone(),
            trend,
        }
    }
}

fn caption(selection: &Selection) -> String {
    format!(
        "state: {} \nlocation: {} \ntype: {}",
        selection.state, selection.location, selection.pollutant_type
    )
}

fn trend_title(selection: &Selection) -> String {
    format!(
        "SO2 and NO2 Levels Over Time in {}/{}",
        selection.month, selection.year
    )
}
