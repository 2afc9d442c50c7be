//! CSV Data Loader Module
//! Reads the air-quality CSV once with Polars and cleans it into a [`CanonicalTable`].

use super::model::{CanonicalTable, Field, Reading};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Columns removed from the table right after loading.
pub const DROPPED_COLUMNS: [&str; 5] = [
    "agency",
    "rspm",
    "spm",
    "location_monitoring_station",
    "pm2_5",
];

/// Columns every source file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = ["state", "location", "type", "date", "so2", "no2"];

/// Date layouts tried in order. Ambiguous numeric dates read month first;
/// the day-first layouts only catch what month-first rejects.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// Loads the dataset on first use and hands out the same table afterwards.
pub struct DatasetLoader {
    path: PathBuf,
    table: Option<Arc<CanonicalTable>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: None,
        }
    }

    /// Return the canonical table, reading the source only on the first call.
    pub fn load(&mut self) -> Result<Arc<CanonicalTable>, DataSourceError> {
        if let Some(table) = &self.table {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(read_table(&self.path)?);
        log::info!(
            "Loaded {} readings from {}",
            table.len(),
            self.path.display()
        );
        log::debug!("Columns: {}", table.column_names().join(", "));
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> &Path {
        &self.path
    }
}

/// Read and clean the CSV at `path`.
pub fn read_table(path: &Path) -> Result<CanonicalTable, DataSourceError> {
    let bytes = std::fs::read(path).map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(&bytes)
}

/// Clean raw ISO-8859-1 CSV bytes into a canonical table.
///
/// Rows whose date is missing or unparseable are skipped without notice.
pub fn parse_csv(bytes: &[u8]) -> Result<CanonicalTable, DataSourceError> {
    let text = decode_latin1(bytes);

    // Every column is read as text; typing happens row by row below
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|n| n == required) {
            return Err(DataSourceError::MissingColumn(required.to_string()));
        }
    }

    let mut layout: Vec<(String, Field)> = Vec::new();
    let mut extra_columns: Vec<String> = Vec::new();
    for name in &names {
        let field = match name.as_str() {
            n if DROPPED_COLUMNS.contains(&n) => continue,
            // Derived below; source values are overwritten
            "year" | "month" => continue,
            "state" => Field::State,
            "location" => Field::Location,
            "type" => Field::Type,
            "date" => Field::Date,
            "so2" => Field::So2,
            "no2" => Field::No2,
            _ => {
                extra_columns.push(name.clone());
                Field::Extra(extra_columns.len() - 1)
            }
        };
        layout.push((name.clone(), field));
    }
    layout.push(("year".to_string(), Field::Year));
    layout.push(("month".to_string(), Field::Month));

    let states = text_column(&df, "state")?;
    let locations = text_column(&df, "location")?;
    let types = text_column(&df, "type")?;
    let dates = text_column(&df, "date")?;
    let so2 = text_column(&df, "so2")?;
    let no2 = text_column(&df, "no2")?;
    let extras = extra_columns
        .iter()
        .map(|name| text_column(&df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut readings = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(date) = dates[i].and_then(parse_date) else {
            continue;
        };

        let extra = extras
            .iter()
            .map(|column| column[i].map(str::to_string))
            .collect();

        readings.push(
            Reading::from_cells(
                category(states[i]),
                category(locations[i]),
                category(types[i]),
                date,
                parse_measurement(so2[i]),
                parse_measurement(no2[i]),
            )
            .with_extra(extra),
        );
    }

    Ok(CanonicalTable::new(readings, layout, extra_columns))
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<Vec<Option<&'a str>>, DataSourceError> {
    let column = df
        .column(name)
        .map_err(|_| DataSourceError::MissingColumn(name.to_string()))?;
    let values = column.as_materialized_series().str()?;
    Ok(values.into_iter().collect())
}

/// Map each byte to the code point of the same value (ISO-8859-1).
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a calendar date, returning `None` for anything unrecognized.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Empty or blank text cells carry no category.
fn category(cell: Option<&str>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

fn parse_measurement(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "stn_code,sampling_date,state,location,agency,type,so2,no2,rspm,spm,location_monitoring_station,pm2_5,date";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text.into_bytes()
    }

    fn write_fixture(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 2, 1).unwrap();
        assert_eq!(parse_date("1990-02-01"), Some(expected));
        assert_eq!(parse_date(" 02-01-1990 "), Some(expected));
        assert_eq!(parse_date("02/01/1990"), Some(expected));
        assert_eq!(parse_date("1990/02/01"), Some(expected));
        assert_eq!(parse_date("1990-02-01 00:00:00"), Some(expected));
        assert_eq!(parse_date("1990-02-01T00:00:00"), Some(expected));
        assert_eq!(parse_date("invalid"), None);
        assert_eq!(parse_date("1990-13-45"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_numeric_dates_read_month_first() {
        let jan_2 = NaiveDate::from_ymd_opt(1990, 1, 2).unwrap();
        let dec_25 = NaiveDate::from_ymd_opt(1990, 12, 25).unwrap();
        assert_eq!(parse_date("01/02/1990"), Some(jan_2));
        assert_eq!(parse_date("01-02-1990"), Some(jan_2));
        assert_eq!(parse_date("12/25/1990"), Some(dec_25));
        // No month 25, so the day-first reading applies
        assert_eq!(parse_date("25/12/1990"), Some(dec_25));
    }

    #[test]
    fn test_month_first_rows_are_kept() {
        let bytes = csv(&[
            "150,x,Goa,Panaji,Board,Residential,4.8,17.4,,,,,12/25/1990",
            "151,x,Goa,Panaji,Board,Residential,3.1,7,,,,,01/02/1990",
        ]);

        let table = parse_csv(&bytes).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.readings()[0].month, 12);
        assert_eq!(table.readings()[1].month, 1);
        assert_eq!(table.readings()[1].date.to_string(), "1990-01-02");
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode_latin1(b"Pondich\xe9rry"), "Pondichérry");
        assert_eq!(decode_latin1(b"plain"), "plain");
    }

    #[test]
    fn test_rows_with_bad_dates_are_dropped() {
        let bytes = csv(&[
            "150,February - M021990,Andhra Pradesh,Hyderabad,Board,Residential,4.8,17.4,,,,,1990-02-01",
            "151,February - M021990,Andhra Pradesh,Hyderabad,Board,Industrial,3.1,7,,,,,invalid",
            "152,,Andhra Pradesh,Hyderabad,Board,Industrial,6.2,28.5,,,,,",
            "153,March - M031990,Goa,Panaji,Board,Residential,,9.1,,,,,1990-03-15",
        ]);

        let table = parse_csv(&bytes).unwrap();

        assert_eq!(table.len(), 2);
        let dates: Vec<String> = table
            .readings()
            .iter()
            .map(|r| r.date.to_string())
            .collect();
        assert_eq!(dates, vec!["1990-02-01", "1990-03-15"]);
        assert_eq!(table.readings()[0].year, 1990);
        assert_eq!(table.readings()[1].month, 3);
    }

    #[test]
    fn test_dropped_columns_are_absent() {
        let bytes = csv(&[
            "150,February - M021990,Andhra Pradesh,Hyderabad,Board,Residential,4.8,17.4,12,30,Site A,5,1990-02-01",
        ]);

        let table = parse_csv(&bytes).unwrap();

        let names = table.column_names();
        for dropped in DROPPED_COLUMNS {
            assert!(!names.iter().any(|n| n == dropped), "{dropped} still present");
        }
        assert_eq!(
            names,
            vec![
                "stn_code",
                "sampling_date",
                "state",
                "location",
                "type",
                "so2",
                "no2",
                "date",
                "year",
                "month"
            ]
        );
        assert_eq!(table.extra_columns(), &["stn_code", "sampling_date"]);
        assert_eq!(
            table.readings()[0].extra,
            vec![Some("150".to_string()), Some("February - M021990".to_string())]
        );
    }

    #[test]
    fn test_measurements_and_text_cells() {
        let bytes = csv(&[
            "150,x,Goa,Panaji,Board,Residential,n/a,17.4,,,,,1990-02-01",
            "151,x,Goa,,Board,,2.5,,,,,,1990-02-02",
        ]);

        let table = parse_csv(&bytes).unwrap();

        let first = &table.readings()[0];
        assert_eq!(first.so2, None);
        assert_eq!(first.no2, Some(17.4));
        let second = &table.readings()[1];
        assert_eq!(first.location.as_deref(), Some("Panaji"));
        assert_eq!(second.location, None);
        assert_eq!(second.pollutant_type, None);
        assert_eq!(second.so2, Some(2.5));
        assert_eq!(second.no2, None);
    }

    #[test]
    fn test_latin1_source_is_decoded() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(b"\n1,x,Puducherry,Pondich\xe9ry,Board,Residential,1,2,,,,,2001-05-05\n");

        let table = parse_csv(&bytes).unwrap();

        assert_eq!(table.readings()[0].location.as_deref(), Some("Pondichéry"));
    }

    #[test]
    fn test_missing_required_column_fails() {
        let bytes = b"state,location,type,date,so2\nGoa,Panaji,RSPM,2001-01-01,1\n";
        let err = parse_csv(bytes).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(ref c) if c == "no2"));
    }

    #[test]
    fn test_missing_file_is_data_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DatasetLoader::new(dir.path().join("absent.csv"));
        let err = loader.load().unwrap_err();
        assert!(matches!(err, DataSourceError::Io { .. }));
        assert!(loader.table.is_none());
    }

    #[test]
    fn test_load_reads_source_once() {
        let file = write_fixture(&csv(&[
            "150,x,Goa,Panaji,Board,Residential,4.8,17.4,,,,,1990-02-01",
        ]));
        let path = file.path().to_path_buf();
        let mut loader = DatasetLoader::new(&path);

        let first = loader.load().unwrap();
        // A second read would fail now, so success proves the cached table was used
        file.close().unwrap();
        assert!(!path.exists());
        let second = loader.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(second.len(), 1);
    }
}
