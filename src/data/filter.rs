//! Selection criteria and the date-sorted filtered view.

use super::model::{CanonicalTable, Choice, Field, Reading};
use chrono::NaiveDate;

/// The user's current filter choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub state: String,
    pub location: String,
    pub pollutant_type: String,
    pub year: Choice<i32>,
    pub month: Choice<u32>,
}

impl Selection {
    /// First option of every selector, or `None` when the table is empty.
    pub fn initial(table: &CanonicalTable) -> Option<Self> {
        let state = table.states().into_iter().next()?;
        let location = table
            .locations_for(&state)
            .into_iter()
            .next()
            .unwrap_or_default();
        let pollutant_type = table.pollutant_types().into_iter().next()?;

        Some(Self {
            state,
            location,
            pollutant_type,
            year: Choice::All,
            month: Choice::All,
        })
    }

    /// Keep `location` among the locations observed for `state`.
    ///
    /// Returns true if the location had to be reset.
    pub fn reconcile(&mut self, table: &CanonicalTable) -> bool {
        let locations = table.locations_for(&self.state);
        if locations.contains(&self.location) {
            return false;
        }
        self.location = locations.into_iter().next().unwrap_or_default();
        true
    }

    /// Whether `reading` satisfies every predicate.
    pub fn matches(&self, reading: &Reading) -> bool {
        reading.state.as_deref() == Some(self.state.as_str())
            && reading.location.as_deref() == Some(self.location.as_str())
            && self.year.admits(&reading.year)
            && self.month.admits(&reading.month)
            && reading.pollutant_type.as_deref() == Some(self.pollutant_type.as_str())
    }
}

/// Rows of the canonical table matching a [`Selection`], sorted by date.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a CanonicalTable,
    rows: Vec<&'a Reading>,
}

/// One point of the SO2/NO2 time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
}

/// Apply all selection predicates as one conjunction.
pub fn filter<'a>(table: &'a CanonicalTable, selection: &Selection) -> FilteredView<'a> {
    let mut rows: Vec<&Reading> = table
        .readings()
        .iter()
        .filter(|r| selection.matches(r))
        .collect();
    rows.sort_by_key(|r| r.date);

    FilteredView { table, rows }
}

impl<'a> FilteredView<'a> {
    pub fn rows(&self) -> &[&'a Reading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns shown in the data grid: everything except the selector columns.
    pub fn display_columns(&self) -> Vec<(String, Field)> {
        self.table
            .layout()
            .iter()
            .filter(|(_, field)| !field.is_selector())
            .cloned()
            .collect()
    }

    /// Headers and text cells for the data grid.
    pub fn display_table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let columns = self.display_columns();
        let headers = columns.iter().map(|(name, _)| name.clone()).collect();
        let rows = self
            .rows()
            .iter()
            .map(|r| columns.iter().map(|(_, field)| field.cell(r)).collect())
            .collect();
        (headers, rows)
    }

    /// SO2 and NO2 against date, in view order.
    pub fn trend(&self) -> Vec<TrendPoint> {
        self.rows()
            .iter()
            .map(|r| TrendPoint {
                date: r.date,
                so2: r.so2,
                no2: r.no2,
            })
            .collect()
    }
}
