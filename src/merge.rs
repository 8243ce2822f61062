//! Cases, deaths and recovered combined on one calendar-date index.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde_json::{Map, Value};

use crate::dates;
use crate::error::Result;
use crate::series::{DateIndexedTable, SeriesKind};

pub const LEFT_COLUMN: &str = "left";
pub const RIGHT_COLUMN: &str = "right";
pub const INDEX_COLUMN: &str = "index";

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Spaces become underscores so `<country><suffix>` names stay unambiguous.
pub fn column_safe(country: &str) -> String {
    country.replace(' ', "_")
}

/// Typed address of one merged column.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub country: String,
    pub kind: SeriesKind,
}

impl SeriesKey {
    pub fn new(country: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            country: country.into(),
            kind,
        }
    }

    pub fn column_name(&self) -> String {
        format!("{}{}", column_safe(&self.country), self.kind.suffix())
    }
}

/// Outer join of the three date-indexed tables.
///
/// A cell is `None` when its source table had no row for that date or the
/// source cell itself was empty. `left`/`right` are the index date shifted by
/// half a day, used as bar edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedCountryTable {
    index: Vec<NaiveDate>,
    left: Vec<NaiveDateTime>,
    right: Vec<NaiveDateTime>,
    columns: BTreeMap<SeriesKey, Vec<Option<f64>>>,
    names: BTreeMap<String, SeriesKey>,
}

pub fn merge(
    cases: &DateIndexedTable,
    deaths: &DateIndexedTable,
    recovered: &DateIndexedTable,
) -> Result<MergedCountryTable> {
    let sources = [
        (SeriesKind::Cases, cases),
        (SeriesKind::Deaths, deaths),
        (SeriesKind::Recovered, recovered),
    ];

    let mut parsed = Vec::with_capacity(sources.len());
    let mut all_dates = BTreeSet::new();
    for (kind, table) in sources {
        let table_dates = table
            .index()
            .iter()
            .map(|label| dates::parse_label(label))
            .collect::<Result<Vec<_>>>()?;
        all_dates.extend(table_dates.iter().copied());
        parsed.push((kind, table, table_dates));
    }

    let index: Vec<NaiveDate> = all_dates.into_iter().collect();
    let position: HashMap<NaiveDate, usize> = index.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut columns = BTreeMap::new();
    let mut names = BTreeMap::new();
    for (kind, table, table_dates) in parsed {
        for country in table.columns() {
            let Some(values) = table.column(country) else {
                continue;
            };
            let mut merged = vec![None; index.len()];
            for (date, value) in table_dates.iter().zip(values) {
                merged[position[date]] = value;
            }
            let key = SeriesKey::new(country.clone(), kind);
            names.insert(key.column_name(), key.clone());
            columns.insert(key, merged);
        }
    }

    let half_day = TimeDelta::hours(12);
    let midnight: Vec<NaiveDateTime> = index.iter().map(|d| d.and_time(NaiveTime::MIN)).collect();
    let left = midnight.iter().map(|dt| *dt - half_day).collect();
    let right = midnight.iter().map(|dt| *dt + half_day).collect();

    tracing::info!(dates = index.len(), columns = columns.len(), "Merged country series");

    Ok(MergedCountryTable {
        index,
        left,
        right,
        columns,
        names,
    })
}

impl MergedCountryTable {
    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn left(&self) -> &[NaiveDateTime] {
        &self.left
    }

    pub fn right(&self) -> &[NaiveDateTime] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.index.first()?, *self.index.last()?))
    }

    /// Index positions with `start <= date <= end`.
    pub fn dates_between(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let lo = self.index.partition_point(|d| *d < start);
        let hi = self.index.partition_point(|d| *d <= end);
        lo..hi.max(lo)
    }

    pub fn series(&self, key: &SeriesKey) -> Option<&[Option<f64>]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    /// Lookup by `<Country_Name><suffix>`.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series(self.names.get(name)?)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Countries with at least one series.
    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = self.columns.keys().map(|k| k.country.as_str()).collect();
        countries.dedup();
        countries
    }

    pub fn contains_country(&self, country: &str) -> bool {
        SeriesKind::ALL
            .iter()
            .any(|kind| self.columns.contains_key(&SeriesKey::new(country, *kind)))
    }

    /// The three series of one country plus bar edges. Missing series are all `None`.
    pub fn slice(&self, country: &str) -> CountrySeries {
        let take = |kind| {
            self.series(&SeriesKey::new(country, kind))
                .map(<[Option<f64>]>::to_vec)
                .unwrap_or_else(|| vec![None; self.index.len()])
        };
        CountrySeries {
            country: country.to_string(),
            index: self.index.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            cases: take(SeriesKind::Cases),
            deaths: take(SeriesKind::Deaths),
            recovered: take(SeriesKind::Recovered),
        }
    }
}

/// Per-country slice handed to the bar chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    pub index: Vec<NaiveDate>,
    pub left: Vec<NaiveDateTime>,
    pub right: Vec<NaiveDateTime>,
    pub cases: Vec<Option<f64>>,
    pub deaths: Vec<Option<f64>>,
    pub recovered: Vec<Option<f64>>,
}

impl CountrySeries {
    pub fn values(&self, kind: SeriesKind) -> &[Option<f64>] {
        match kind {
            SeriesKind::Cases => &self.cases,
            SeriesKind::Deaths => &self.deaths,
            SeriesKind::Recovered => &self.recovered,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Value on `date`, `None` when the date is off the index or the cell is empty.
    pub fn value_at(&self, kind: SeriesKind, date: NaiveDate) -> Option<f64> {
        let pos = self.index.binary_search(&date).ok()?;
        self.values(kind).get(pos).copied().flatten()
    }

    pub fn max_value(&self) -> Option<f64> {
        SeriesKind::ALL
            .iter()
            .flat_map(|kind| self.values(*kind).iter().flatten())
            .copied()
            .reduce(f64::max)
    }

    /// Rows within `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> CountrySeries {
        let lo = self.index.partition_point(|d| *d < start);
        let hi = self.index.partition_point(|d| *d <= end).max(lo);
        CountrySeries {
            country: self.country.clone(),
            index: self.index[lo..hi].to_vec(),
            left: self.left[lo..hi].to_vec(),
            right: self.right[lo..hi].to_vec(),
            cases: self.cases[lo..hi].to_vec(),
            deaths: self.deaths[lo..hi].to_vec(),
            recovered: self.recovered[lo..hi].to_vec(),
        }
    }

    pub fn column_name(&self, kind: SeriesKind) -> String {
        SeriesKey::new(self.country.clone(), kind).column_name()
    }

    /// Column source keyed `<Country>_cases`, `<Country>_deaths`,
    /// `<Country>_recovered`, `left`, `right` and `index`.
    ///
    /// Interchange format for renderers outside this crate; the terminal bar
    /// chart reads the typed fields directly.
    pub fn to_column_source(&self) -> Map<String, Value> {
        let numbers = |values: &[Option<f64>]| {
            Value::Array(values.iter().map(|v| v.map_or(Value::Null, Value::from)).collect())
        };
        let stamps = |values: &[NaiveDateTime]| {
            Value::Array(
                values
                    .iter()
                    .map(|dt| Value::from(dt.format(DATETIME_FORMAT).to_string()))
                    .collect(),
            )
        };

        let mut source = Map::new();
        for kind in SeriesKind::ALL {
            source.insert(self.column_name(kind), numbers(self.values(kind)));
        }
        source.insert(LEFT_COLUMN.to_string(), stamps(&self.left));
        source.insert(RIGHT_COLUMN.to_string(), stamps(&self.right));
        source.insert(
            INDEX_COLUMN.to_string(),
            Value::Array(
                self.index
                    .iter()
                    .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
                    .collect(),
            ),
        );
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{RawSeriesRow, RawSeriesTable, reshape};
    use proptest::prelude::*;

    fn indexed(labels: &[&str], rows: &[(&str, Vec<Option<f64>>)]) -> DateIndexedTable {
        let raw = RawSeriesTable::new(
            labels.iter().map(|l| l.to_string()).collect(),
            rows.iter()
                .map(|(country, values)| RawSeriesRow {
                    country: country.to_string(),
                    values: values.clone(),
                })
                .collect(),
        );
        reshape(&raw).1
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    #[test]
    fn test_outer_join_on_dates() {
        let cases = indexed(&["1/22/20", "1/23/20"], &[("Germany", vec![Some(10.0), Some(12.0)])]);
        let deaths = indexed(&["1/23/20", "1/24/20"], &[("Germany", vec![Some(1.0), Some(2.0)])]);
        let recovered = indexed(&["1/22/20"], &[("Germany", vec![Some(3.0)])]);
        let merged = merge(&cases, &deaths, &recovered).unwrap();

        assert_eq!(merged.index(), &[date(1, 22), date(1, 23), date(1, 24)]);
        assert_eq!(merged.column("Germany_cases").unwrap(), &[Some(10.0), Some(12.0), None]);
        assert_eq!(merged.column("Germany_deaths").unwrap(), &[None, Some(1.0), Some(2.0)]);
        assert_eq!(merged.column("Germany_recovered").unwrap(), &[Some(3.0), None, None]);
    }

    #[test]
    fn test_index_sorted_by_calendar_not_label() {
        let cases = indexed(&["12/31/20", "1/2/21", "2/1/20"], &[("Italy", vec![Some(1.0), Some(2.0), Some(3.0)])]);
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();

        assert_eq!(
            merged.index(),
            &[
                date(2, 1),
                date(12, 31),
                NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()
            ]
        );
        assert_eq!(merged.column("Italy_cases").unwrap(), &[Some(3.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_bar_edges_are_half_a_day_out() {
        let cases = indexed(&["3/1/20"], &[("Spain", vec![Some(1.0)])]);
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();

        let midnight = date(3, 1).and_time(NaiveTime::MIN);
        assert_eq!(merged.left()[0], midnight - TimeDelta::hours(12));
        assert_eq!(merged.right()[0], midnight + TimeDelta::hours(12));
    }

    #[test]
    fn test_column_names_replace_spaces() {
        let cases = indexed(&["3/1/20"], &[("United Kingdom", vec![Some(1.0)])]);
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();

        assert_eq!(merged.column_names().collect::<Vec<_>>(), vec!["United_Kingdom_cases"]);
        assert!(merged.column("United Kingdom_cases").is_none());
        let key = SeriesKey::new("United Kingdom", SeriesKind::Cases);
        assert_eq!(merged.series(&key).unwrap(), &[Some(1.0)]);
    }

    #[test]
    fn test_slice_fills_missing_series() {
        let cases = indexed(&["3/1/20", "3/2/20"], &[("Spain", vec![Some(1.0), Some(4.0)])]);
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();

        let spain = merged.slice("Spain");
        assert_eq!(spain.cases, vec![Some(1.0), Some(4.0)]);
        assert_eq!(spain.deaths, vec![None, None]);
        assert_eq!(spain.max_value(), Some(4.0));
        assert_eq!(spain.value_at(SeriesKind::Cases, date(3, 2)), Some(4.0));
        assert_eq!(spain.value_at(SeriesKind::Deaths, date(3, 2)), None);
        assert_eq!(spain.value_at(SeriesKind::Cases, date(3, 9)), None);
        assert!(merged.contains_country("Spain"));
        assert!(!merged.contains_country("Portugal"));
        assert_eq!(merged.slice("Portugal").max_value(), None);
    }

    #[test]
    fn test_range_queries() {
        let cases = indexed(
            &["3/1/20", "3/2/20", "3/3/20", "3/4/20"],
            &[("Spain", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])],
        );
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();

        assert_eq!(merged.dates_between(date(3, 2), date(3, 3)), 1..3);
        assert_eq!(merged.dates_between(date(4, 1), date(3, 1)), 4..4);
        let window = merged.slice("Spain").between(date(3, 2), date(3, 10));
        assert_eq!(window.cases, vec![Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(merged.date_range(), Some((date(3, 1), date(3, 4))));
    }

    #[test]
    fn test_column_source_keys() {
        let cases = indexed(&["3/1/20"], &[("South Korea", vec![Some(7.0)])]);
        let empty = DateIndexedTable::default();
        let merged = merge(&cases, &empty, &empty).unwrap();
        let source = merged.slice("South Korea").to_column_source();

        let mut keys: Vec<&str> = source.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "South_Korea_cases",
                "South_Korea_deaths",
                "South_Korea_recovered",
                "index",
                "left",
                "right"
            ]
        );
        assert_eq!(source["South_Korea_cases"], serde_json::json!([7.0]));
        assert_eq!(source["South_Korea_deaths"], serde_json::json!([null]));
        assert_eq!(source["left"], serde_json::json!(["2020-02-29T12:00:00"]));
        assert_eq!(source["right"], serde_json::json!(["2020-03-01T12:00:00"]));
    }

    #[test]
    fn test_bad_label_is_an_error() {
        let raw = RawSeriesTable::new(
            vec!["someday".to_string()],
            vec![RawSeriesRow { country: "Spain".into(), values: vec![Some(1.0)] }],
        );
        let (_, indexed) = reshape(&raw);
        let empty = DateIndexedTable::default();
        assert!(merge(&indexed, &empty, &empty).is_err());
    }

    fn day_set() -> impl Strategy<Value = BTreeSet<u32>> {
        prop::collection::btree_set(1u32..29, 0..10)
    }

    proptest! {
        #[test]
        fn index_is_union_and_absence_tracks_source(a in day_set(), b in day_set(), c in day_set()) {
            let table = |days: &BTreeSet<u32>| {
                let labels: Vec<String> = days.iter().map(|d| format!("2/{d}/20")).collect();
                let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
                let values: Vec<Option<f64>> = days.iter().map(|d| Some(f64::from(*d))).collect();
                indexed(&label_refs, &[("Chile", values)])
            };
            let merged = merge(&table(&a), &table(&b), &table(&c)).unwrap();

            let union: BTreeSet<u32> = a.iter().chain(&b).chain(&c).copied().collect();
            let expected: Vec<NaiveDate> = union.iter().map(|d| date(2, *d)).collect();
            prop_assert_eq!(merged.index(), expected.as_slice());

            for (kind, days) in [(SeriesKind::Cases, &a), (SeriesKind::Deaths, &b), (SeriesKind::Recovered, &c)] {
                let key = SeriesKey::new("Chile", kind);
                let Some(series) = merged.series(&key) else {
                    prop_assert!(days.is_empty());
                    continue;
                };
                for (d, cell) in merged.index().iter().zip(series) {
                    prop_assert_eq!(cell.is_some(), days.contains(&chrono::Datelike::day(d)));
                }
            }
        }
    }
}
