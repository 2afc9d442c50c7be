//! Canonical Table Module
//! Typed readings and the immutable table built by the loader.

use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Date format used when printing readings.
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";

/// One pollutant measurement record.
///
/// Empty categorical cells are `None`: they are never counted as a category
/// and never match a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub state: Option<String>,
    pub location: Option<String>,
    pub pollutant_type: Option<String>,
    pub date: NaiveDate,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    pub year: i32,
    pub month: u32,
    /// Pass-through cells, aligned with [`CanonicalTable::extra_columns`].
    pub extra: Vec<Option<String>>,
}

impl Reading {
    /// Build a reading, deriving `year` and `month` from `date`.
    pub fn new(
        state: impl Into<String>,
        location: impl Into<String>,
        pollutant_type: impl Into<String>,
        date: NaiveDate,
        so2: Option<f64>,
        no2: Option<f64>,
    ) -> Self {
        Self::from_cells(
            Some(state.into()),
            Some(location.into()),
            Some(pollutant_type.into()),
            date,
            so2,
            no2,
        )
    }

    /// Like [`Reading::new`], but any categorical cell may be missing.
    pub fn from_cells(
        state: Option<String>,
        location: Option<String>,
        pollutant_type: Option<String>,
        date: NaiveDate,
        so2: Option<f64>,
        no2: Option<f64>,
    ) -> Self {
        Self {
            state,
            location,
            pollutant_type,
            date,
            so2,
            no2,
            year: date.year(),
            month: date.month(),
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: Vec<Option<String>>) -> Self {
        self.extra = extra;
        self
    }
}

/// Where a table column lives inside a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    State,
    Location,
    Type,
    Date,
    So2,
    No2,
    Year,
    Month,
    Extra(usize),
}

impl Field {
    /// Fields hidden from the tabular display (they are shown by the selectors).
    pub fn is_selector(&self) -> bool {
        matches!(
            self,
            Field::State | Field::Location | Field::Type | Field::Year | Field::Month
        )
    }

    /// Render the cell of `reading` for this field.
    pub fn cell(&self, reading: &Reading) -> String {
        match self {
            Field::State => reading.state.clone().unwrap_or_default(),
            Field::Location => reading.location.clone().unwrap_or_default(),
            Field::Type => reading.pollutant_type.clone().unwrap_or_default(),
            Field::Date => reading.date.format(DISPLAY_DATE_FORMAT).to_string(),
            Field::So2 => format_measurement(reading.so2),
            Field::No2 => format_measurement(reading.no2),
            Field::Year => reading.year.to_string(),
            Field::Month => reading.month.to_string(),
            Field::Extra(idx) => reading
                .extra
                .get(*idx)
                .cloned()
                .flatten()
                .unwrap_or_default(),
        }
    }
}

fn format_measurement(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// A year or month choice where `All` disables the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    /// Whether `value` passes this choice.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "all"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// The cleaned, read-only collection of all valid readings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
    readings: Vec<Reading>,
    /// Column name and accessor, in display order.
    layout: Vec<(String, Field)>,
    extra_columns: Vec<String>,
}

impl CanonicalTable {
    /// Assemble a table. `layout` must reference only the extra columns given.
    pub fn new(
        readings: Vec<Reading>,
        layout: Vec<(String, Field)>,
        extra_columns: Vec<String>,
    ) -> Self {
        Self {
            readings,
            layout,
            extra_columns,
        }
    }

    /// Table with the standard column layout and no pass-through columns.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        let layout = vec![
            ("state".to_string(), Field::State),
            ("location".to_string(), Field::Location),
            ("type".to_string(), Field::Type),
            ("so2".to_string(), Field::So2),
            ("no2".to_string(), Field::No2),
            ("date".to_string(), Field::Date),
            ("year".to_string(), Field::Year),
            ("month".to_string(), Field::Month),
        ];
        Self::new(readings, layout, Vec::new())
    }

    /// Same layout, different rows.
    pub fn with_readings(&self, readings: Vec<Reading>) -> Self {
        Self {
            readings,
            layout: self.layout.clone(),
            extra_columns: self.extra_columns.clone(),
        }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn layout(&self) -> &[(String, Field)] {
        &self.layout
    }

    #[cfg(test)]
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Column names in display order.
    pub fn column_names(&self) -> Vec<String> {
        self.layout.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Distinct states in order of first appearance.
    pub fn states(&self) -> Vec<String> {
        unique_in_order(self.readings.iter().filter_map(|r| r.state.as_deref()))
    }

    /// Distinct locations observed for `state`, in order of first appearance.
    pub fn locations_for(&self, state: &str) -> Vec<String> {
        unique_in_order(
            self.readings
                .iter()
                .filter(|r| r.state.as_deref() == Some(state))
                .filter_map(|r| r.location.as_deref()),
        )
    }

    /// Distinct pollutant types in order of first appearance.
    pub fn pollutant_types(&self) -> Vec<String> {
        unique_in_order(
            self.readings
                .iter()
                .filter_map(|r| r.pollutant_type.as_deref()),
        )
    }

    /// `all` followed by the sorted distinct years.
    pub fn year_choices(&self) -> Vec<Choice<i32>> {
        let years: BTreeSet<i32> = self.readings.iter().map(|r| r.year).collect();
        std::iter::once(Choice::All)
            .chain(years.into_iter().map(Choice::Only))
            .collect()
    }

    /// `all` followed by the sorted distinct months.
    pub fn month_choices(&self) -> Vec<Choice<u32>> {
        let months: BTreeSet<u32> = self.readings.iter().map(|r| r.month).collect();
        std::iter::once(Choice::All)
            .chain(months.into_iter().map(Choice::Only))
            .collect()
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
