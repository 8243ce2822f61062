//! Johns Hopkins time-series tables: loading, aggregation and reshaping.
//!
//! The source CSVs are wide (one column per reported date). [`reshape`] turns
//! a loaded table into a tidy table for per-date lookups and a date-indexed
//! table for per-country series.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::country_names;
use crate::dates;
use crate::error::{AtlasError, Result};

pub const COUNTRY_COLUMN: &str = "Country/Region";

/// Metadata columns dropped on load.
pub const METADATA_COLUMNS: &[&str] = &["Province/State", "Lat", "Long", "Long_"];

/// The three time series the dashboard shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeriesKind {
    Cases,
    Deaths,
    Recovered,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Cases, SeriesKind::Deaths, SeriesKind::Recovered];

    /// Column-name suffix in the merged table.
    pub fn suffix(self) -> &'static str {
        match self {
            SeriesKind::Cases => "_cases",
            SeriesKind::Deaths => "_deaths",
            SeriesKind::Recovered => "_recovered",
        }
    }

    pub fn config_key(self) -> &'static str {
        match self {
            SeriesKind::Cases => "covid_19_cases",
            SeriesKind::Deaths => "covid_19_deaths",
            SeriesKind::Recovered => "covid_19_recovered",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Cases => "Confirmed cases",
            SeriesKind::Deaths => "Number of deaths",
            SeriesKind::Recovered => "Number of people recovered",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawSeriesRow {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

/// A series CSV with metadata columns already dropped.
///
/// Every row has exactly one value slot per date label; empty cells are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSeriesTable {
    date_labels: Vec<String>,
    rows: Vec<RawSeriesRow>,
}

impl RawSeriesTable {
    /// Builds a table, padding or truncating each row to the number of date labels.
    pub fn new(date_labels: Vec<String>, rows: Vec<RawSeriesRow>) -> Self {
        let width = date_labels.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.values.resize(width, None);
                row
            })
            .collect();
        Self { date_labels, rows }
    }

    pub fn date_labels(&self) -> &[String] {
        &self.date_labels
    }

    pub fn rows(&self) -> &[RawSeriesRow] {
        &self.rows
    }

    /// Reads a series CSV from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| AtlasError::SourceUnreachable {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let table = Self::from_reader(file, path)?;
        tracing::info!(
            path = %path.display(),
            rows = table.rows.len(),
            dates = table.date_labels.len(),
            "Loaded time series"
        );
        Ok(table)
    }

    /// Parses series CSV content. `path` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let csv_err = |source| AtlasError::CsvParse {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(csv_err)?.clone();
        let country_idx = headers
            .iter()
            .position(|h| h == COUNTRY_COLUMN)
            .ok_or_else(|| AtlasError::MissingColumn {
                column: COUNTRY_COLUMN.to_string(),
                path: path.to_path_buf(),
            })?;

        let mut date_columns = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == country_idx || METADATA_COLUMNS.contains(&header) {
                continue;
            }
            if dates::is_date_label(header) {
                date_columns.push((idx, header.to_string()));
            } else {
                tracing::warn!(path = %path.display(), column = header, "Skipping non-date column");
            }
        }

        let mut rows = Vec::new();
        let mut unparsed = 0usize;
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let country = record.get(country_idx).unwrap_or_default().to_string();
            let values = date_columns
                .iter()
                .map(|(idx, _)| {
                    let cell = record.get(*idx).unwrap_or_default();
                    if cell.is_empty() {
                        return None;
                    }
                    let parsed = cell.parse::<f64>().ok();
                    if parsed.is_none() {
                        unparsed += 1;
                    }
                    parsed
                })
                .collect();
            rows.push(RawSeriesRow { country, values });
        }
        if unparsed > 0 {
            tracing::warn!(path = %path.display(), cells = unparsed, "Non-numeric cells treated as missing");
        }

        let date_labels = date_columns.into_iter().map(|(_, label)| label).collect();
        Ok(Self::new(date_labels, rows))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TidyRow {
    pub country: String,
    pub date: String,
    pub value: Option<f64>,
}

/// Long-format table: one row per (country, date label).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TidySeriesTable {
    rows: Vec<TidyRow>,
}

impl TidySeriesTable {
    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose date label equals `label` exactly.
    pub fn for_date<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a TidyRow> + 'a {
        self.rows.iter().filter(move |row| row.date == label)
    }

    /// Smallest and largest present value, for the map color scale.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// One row per date label, one column per canonical country.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DateIndexedTable {
    index: Vec<String>,
    columns: Vec<String>,
    data: Vec<Vec<Option<f64>>>,
}

impl DateIndexedTable {
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    pub fn row(&self, label: &str) -> Option<&[Option<f64>]> {
        let pos = self.index.iter().position(|l| l == label)?;
        Some(&self.data[pos])
    }

    pub fn get(&self, label: &str, country: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == country)?;
        self.row(label)?[col]
    }

    pub fn column(&self, country: &str) -> Option<Vec<Option<f64>>> {
        let col = self.columns.iter().position(|c| c == country)?;
        Some(self.data.iter().map(|row| row[col]).collect())
    }
}

fn add(acc: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (acc, value) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

/// Collapses rows per canonical country, then melts and transposes.
pub fn reshape(raw: &RawSeriesTable) -> (TidySeriesTable, DateIndexedTable) {
    let raw_names: Vec<&str> = raw.rows.iter().map(|r| r.country.as_str()).collect();
    let canonical = country_names::normalize_all(&raw_names);

    let width = raw.date_labels.len();
    let mut aggregated: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for (row, country) in raw.rows.iter().zip(canonical) {
        let sums = aggregated.entry(country).or_insert_with(|| vec![None; width]);
        for (sum, value) in sums.iter_mut().zip(&row.values) {
            *sum = add(*sum, *value);
        }
    }

    let mut tidy_rows = Vec::with_capacity(aggregated.len() * width);
    for (country, values) in &aggregated {
        for (label, value) in raw.date_labels.iter().zip(values) {
            tidy_rows.push(TidyRow {
                country: country.clone(),
                date: label.clone(),
                value: *value,
            });
        }
    }

    let columns: Vec<String> = aggregated.keys().cloned().collect();
    let data = (0..width)
        .map(|i| aggregated.values().map(|values| values[i]).collect())
        .collect();

    tracing::debug!(
        source_rows = raw.rows.len(),
        countries = columns.len(),
        dates = width,
        "Reshaped series"
    );

    (
        TidySeriesTable { rows: tidy_rows },
        DateIndexedTable {
            index: raw.date_labels.clone(),
            columns,
            data,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20
,Germany,51.0,9.0,10,12
,France,46.2,2.2,5,
Bavaria,Germany,48.7,11.4,1,2
";

    fn sample() -> RawSeriesTable {
        RawSeriesTable::from_reader(SAMPLE.as_bytes(), Path::new("sample.csv")).unwrap()
    }

    #[test]
    fn test_metadata_columns_dropped() {
        let raw = sample();
        assert_eq!(raw.date_labels(), &["1/22/20", "1/23/20"]);
        assert_eq!(raw.rows().len(), 3);
        assert_eq!(raw.rows()[1].values, vec![Some(5.0), None]);
    }

    #[test]
    fn test_missing_country_column() {
        let result = RawSeriesTable::from_reader("Lat,Long,1/22/20\n1,2,3\n".as_bytes(), Path::new("x.csv"));
        assert!(matches!(result, Err(AtlasError::MissingColumn { .. })));
    }

    #[test]
    fn test_reshape_melts_with_absent_cells() {
        let (tidy, _) = reshape(&sample());
        let rows: Vec<(&str, &str, Option<f64>)> = tidy
            .rows()
            .iter()
            .map(|r| (r.country.as_str(), r.date.as_str(), r.value))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("France", "1/22/20", Some(5.0)),
                ("France", "1/23/20", None),
                ("Germany", "1/22/20", Some(11.0)),
                ("Germany", "1/23/20", Some(14.0)),
            ]
        );
    }

    #[test]
    fn test_reshape_transposes() {
        let (_, indexed) = reshape(&sample());
        assert_eq!(indexed.shape(), (2, 2));
        assert_eq!(indexed.index(), &["1/22/20", "1/23/20"]);
        assert_eq!(indexed.columns(), &["France", "Germany"]);
        assert_eq!(indexed.get("1/23/20", "Germany"), Some(14.0));
        assert_eq!(indexed.get("1/23/20", "France"), None);
        assert_eq!(indexed.column("France"), Some(vec![Some(5.0), None]));
        assert!(indexed.row("1/24/20").is_none());
    }

    #[test]
    fn test_reshape_merges_spellings() {
        let raw = RawSeriesTable::new(
            vec!["3/1/20".to_string()],
            vec![
                RawSeriesRow { country: "US".to_string(), values: vec![Some(3.0)] },
                RawSeriesRow { country: "United States of America".to_string(), values: vec![Some(4.0)] },
            ],
        );
        let (tidy, indexed) = reshape(&raw);
        assert_eq!(tidy.len(), 1);
        assert_eq!(indexed.get("3/1/20", "United States"), Some(7.0));
    }

    #[test]
    fn test_value_range() {
        let (tidy, _) = reshape(&sample());
        assert_eq!(tidy.value_range(), Some((5.0, 14.0)));
        assert_eq!(TidySeriesTable::default().value_range(), None);
    }

    #[test]
    fn test_non_numeric_cells_are_missing() {
        let csv = "Country/Region,1/22/20,1/23/20\nItaly,n/a,4\n";
        let raw = RawSeriesTable::from_reader(csv.as_bytes(), Path::new("x.csv")).unwrap();
        assert_eq!(raw.rows()[0].values, vec![None, Some(4.0)]);
    }

    fn raw_table_strategy() -> impl Strategy<Value = RawSeriesTable> {
        let countries = prop::sample::select(vec!["Germany", "France", "Italy", "US", "Atlantis"]);
        (1usize..6).prop_flat_map(move |width| {
            let row = (countries.clone(), prop::collection::vec(prop::option::of(0u32..1000), width));
            prop::collection::vec(row, 0..12).prop_map(move |rows| {
                let labels = (1..=width).map(|d| format!("1/{d}/20")).collect();
                let rows = rows
                    .into_iter()
                    .map(|(country, values)| RawSeriesRow {
                        country: country.to_string(),
                        values: values.into_iter().map(|v| v.map(f64::from)).collect(),
                    })
                    .collect();
                RawSeriesTable::new(labels, rows)
            })
        })
    }

    proptest! {
        #[test]
        fn tidy_has_country_times_date_rows(raw in raw_table_strategy()) {
            let (tidy, indexed) = reshape(&raw);
            let (dates, countries) = indexed.shape();
            prop_assert_eq!(tidy.len(), dates * countries);
            prop_assert_eq!(dates, raw.date_labels().len());
        }

        #[test]
        fn aggregation_sums_source_rows(raw in raw_table_strategy()) {
            let (tidy, _) = reshape(&raw);
            for row in tidy.rows() {
                let col = raw.date_labels().iter().position(|l| *l == row.date).unwrap();
                let sources: Vec<Option<f64>> = raw
                    .rows()
                    .iter()
                    .filter(|r| country_names::normalize(&r.country) == row.country)
                    .map(|r| r.values[col])
                    .collect();
                let expected = sources.iter().flatten().copied().reduce(|a, b| a + b);
                prop_assert_eq!(row.value, expected);
            }
        }
    }
}
