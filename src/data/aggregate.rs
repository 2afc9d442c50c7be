//! Data Aggregation Module
//! Collapses rare categories into "Other" so pie charts stay readable.

use super::model::{CanonicalTable, Reading};
use std::collections::HashMap;

/// Label given to merged small slices.
pub const OTHER_LABEL: &str = "Other";

/// Default small-slice thresholds.
pub const STATE_THRESHOLD: f64 = 0.03;
pub const TYPE_THRESHOLD: f64 = 0.05;

/// Categorical column that can be bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    State,
    Type,
}

impl CategoryColumn {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryColumn::State => "state",
            CategoryColumn::Type => "type",
        }
    }

    /// The cell of `reading` in this column, `None` when empty.
    pub fn value<'a>(&self, reading: &'a Reading) -> Option<&'a str> {
        match self {
            CategoryColumn::State => reading.state.as_deref(),
            CategoryColumn::Type => reading.pollutant_type.as_deref(),
        }
    }

    fn set(&self, reading: &mut Reading, label: &str) {
        let cell = Some(label.to_string());
        match self {
            CategoryColumn::State => reading.state = cell,
            CategoryColumn::Type => reading.pollutant_type = cell,
        }
    }
}

/// Occurrences of each present value of `column` and their total.
/// Empty cells count towards neither.
fn value_counts(table: &CanonicalTable, column: CategoryColumn) -> (HashMap<&str, usize>, usize) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0;
    for label in table.readings().iter().filter_map(|r| column.value(r)) {
        *counts.entry(label).or_default() += 1;
        total += 1;
    }
    (counts, total)
}

/// Relative frequency of each distinct value of `column`, over the rows
/// where it is present.
pub fn value_frequencies(table: &CanonicalTable, column: CategoryColumn) -> HashMap<String, f64> {
    let (counts, total) = value_counts(table, column);

    counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count as f64 / total as f64))
        .collect()
}

/// Copy of `table` where every value of `column` rarer than `threshold`
/// is relabeled [`OTHER_LABEL`].
///
/// Frequencies are computed once over the whole table; the merged bucket
/// is never re-checked against the threshold.
pub fn aggregate_small_slices(
    table: &CanonicalTable,
    column: CategoryColumn,
    threshold: f64,
) -> CanonicalTable {
    let frequencies = value_frequencies(table, column);

    let readings = table
        .readings()
        .iter()
        .map(|reading| {
            let mut reading = reading.clone();
            let is_small = column
                .value(&reading)
                .and_then(|label| frequencies.get(label))
                .is_some_and(|&freq| freq < threshold);
            if is_small {
                column.set(&mut reading, OTHER_LABEL);
            }
            reading
        })
        .collect();

    table.with_readings(readings)
}

/// One pie slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub frequency: f64,
}

/// Label to frequency mapping for one categorical column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    pub column: &'static str,
    pub slices: Vec<Slice>,
}

impl Distribution {
    /// Count every label of `column`, largest slice first.
    pub fn of(table: &CanonicalTable, column: CategoryColumn) -> Self {
        let (counts, total) = value_counts(table, column);

        let mut slices: Vec<Slice> = counts
            .into_iter()
            .map(|(label, count)| Slice {
                label: label.to_string(),
                count,
                frequency: count as f64 / total as f64,
            })
            .collect();
        slices.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        Self {
            column: column.name(),
            slices,
        }
    }

    /// Distribution after merging slices below `threshold` into "Other".
    pub fn aggregated(table: &CanonicalTable, column: CategoryColumn, threshold: f64) -> Self {
        Self::of(&aggregate_small_slices(table, column, threshold), column)
    }

    #[cfg(test)]
    pub fn frequency_of(&self, label: &str) -> Option<f64> {
        self.slices
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.frequency)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.slices.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn reading(state: &str, kind: &str) -> Reading {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        Reading::new(state, "somewhere", kind, date, None, None)
    }

    /// 100 rows: Delhi 60, Kerala 29, Punjab 10, Goa 1.
    fn table() -> CanonicalTable {
        let mut readings = Vec::new();
        readings.extend((0..60).map(|_| reading("Delhi", "Residential")));
        readings.extend((0..29).map(|_| reading("Kerala", "Industrial")));
        readings.extend((0..10).map(|_| reading("Punjab", "Residential")));
        readings.push(reading("Goa", "Sensitive"));
        CanonicalTable::from_readings(readings)
    }

    fn distinct(table: &CanonicalTable, column: CategoryColumn) -> BTreeSet<String> {
        table
            .readings()
            .iter()
            .filter_map(|r| column.value(r).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_rare_state_becomes_other() {
        let table = table();
        let aggregated = aggregate_small_slices(&table, CategoryColumn::State, 0.03);

        let goa_row = aggregated.readings().last().unwrap();
        assert_eq!(goa_row.state.as_deref(), Some(OTHER_LABEL));
        assert_eq!(goa_row.pollutant_type.as_deref(), Some("Sensitive"));
        assert_eq!(
            aggregated
                .readings()
                .iter()
                .filter(|r| r.state.as_deref() == Some("Punjab"))
                .count(),
            10
        );
        // Source table untouched
        assert_eq!(table.readings().last().unwrap().state.as_deref(), Some("Goa"));
    }

    #[test]
    fn test_label_set_and_other_frequency() {
        let table = table();
        let threshold = 0.2;
        let before = value_frequencies(&table, CategoryColumn::State);
        let aggregated = aggregate_small_slices(&table, CategoryColumn::State, threshold);

        let mut expected: BTreeSet<String> = before
            .iter()
            .filter(|&(_, &f)| f >= threshold)
            .map(|(k, _)| k.clone())
            .collect();
        expected.insert(OTHER_LABEL.to_string());
        assert_eq!(distinct(&aggregated, CategoryColumn::State), expected);

        let small_sum: f64 = before.values().filter(|&&f| f < threshold).sum();
        let after = value_frequencies(&aggregated, CategoryColumn::State);
        assert!((after[OTHER_LABEL] - small_sum).abs() < 1e-9);
        assert!((after[OTHER_LABEL] - 0.11).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_below_threshold_is_unchanged() {
        let table = table();
        let aggregated = aggregate_small_slices(&table, CategoryColumn::State, 0.005);
        assert_eq!(aggregated, table);
    }

    #[test]
    fn test_other_bucket_is_not_rechecked() {
        let table = table();
        // Kerala, Punjab and Goa merge into 0.40, still below the threshold
        let aggregated = aggregate_small_slices(&table, CategoryColumn::State, 0.5);
        let labels = distinct(&aggregated, CategoryColumn::State);
        assert_eq!(
            labels,
            BTreeSet::from(["Delhi".to_string(), OTHER_LABEL.to_string()])
        );
    }

    #[test]
    fn test_type_column_bucketing() {
        let table = table();
        let dist = Distribution::aggregated(&table, CategoryColumn::Type, 0.05);
        assert_eq!(dist.column, "type");
        assert_eq!(dist.labels(), vec!["Residential", "Industrial", OTHER_LABEL]);
        assert_eq!(dist.frequency_of(OTHER_LABEL), Some(0.01));
        assert_eq!(dist.frequency_of("Sensitive"), None);
    }

    #[test]
    fn test_distribution_orders_by_count() {
        let dist = Distribution::of(&table(), CategoryColumn::State);
        assert_eq!(dist.labels(), vec!["Delhi", "Kerala", "Punjab", "Goa"]);
        let total: f64 = dist.slices.iter().map(|s| s.frequency).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_type_cells_are_left_out() {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let mut readings = vec![reading("Goa", "A"), reading("Goa", "A"), reading("Goa", "B")];
        readings.push(Reading::from_cells(
            Some("Goa".to_string()),
            None,
            None,
            date,
            None,
            None,
        ));
        let table = CanonicalTable::from_readings(readings);

        let dist = Distribution::of(&table, CategoryColumn::Type);
        assert_eq!(dist.labels(), vec!["A", "B"]);
        assert!((dist.frequency_of("A").unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert!((dist.frequency_of("B").unwrap() - 1.0 / 3.0).abs() < 1e-9);

        // B sits at 0.33, so only the empty cell could fall under 0.3
        let aggregated = aggregate_small_slices(&table, CategoryColumn::Type, 0.3);
        assert_eq!(aggregated, table);
        assert_eq!(aggregated.readings()[3].pollutant_type, None);
    }

    #[test]
    fn test_empty_table() {
        let empty = CanonicalTable::default();
        assert!(aggregate_small_slices(&empty, CategoryColumn::State, 0.03).is_empty());
        assert!(Distribution::of(&empty, CategoryColumn::Type).is_empty());
        assert!(value_frequencies(&empty, CategoryColumn::Type).is_empty());
    }
}
