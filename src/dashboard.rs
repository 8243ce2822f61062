//! Dashboard controller: selected date and country, and the views derived from them.
//!
//! [`update`] is the pure transition `(state, event) -> (state, view)`;
//! [`Dashboard`] owns the state, caches the last views and notifies listeners.

use chrono::{NaiveDate, TimeDelta};

use crate::config::Config;
use crate::dates::{self, DISPLAY_FORMAT};
use crate::error::{AtlasError, Result};
use crate::geometry::GeometryTable;
use crate::merge::{CountrySeries, MergedCountryTable, merge};
use crate::series::{RawSeriesTable, SeriesKind, TidySeriesTable, reshape};
use crate::snapshot::{GeoSnapshot, build_snapshot};

pub const DEFAULT_COUNTRY: &str = "Germany";
pub const MAP_TITLE: &str = "Coronavirus confirmed cases";

/// Immutable tables built once at startup.
#[derive(Clone, Debug)]
pub struct DashboardData {
    cases: TidySeriesTable,
    geometry: GeometryTable,
    merged: MergedCountryTable,
    countries: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl DashboardData {
    /// `today` bounds the slider: the last selectable date is the day before.
    ///
    /// Fails with [`AtlasError::EmptyGeometry`] when there is no country to select.
    pub fn new(
        cases: TidySeriesTable,
        geometry: GeometryTable,
        merged: MergedCountryTable,
        today: NaiveDate,
    ) -> Result<Self> {
        let countries = geometry.countries();
        if countries.is_empty() {
            return Err(AtlasError::EmptyGeometry);
        }
        let start = dates::dataset_start();
        let end = today.pred_opt().unwrap_or(today).max(start);
        Ok(Self {
            cases,
            geometry,
            merged,
            countries,
            start,
            end,
        })
    }

    /// Loads the three series and the geometry named in `config`.
    pub fn load(config: &Config, today: NaiveDate) -> Result<Self> {
        let (cases, cases_by_date) = reshape(&RawSeriesTable::load(config.source(SeriesKind::Cases))?);
        let (_, deaths_by_date) = reshape(&RawSeriesTable::load(config.source(SeriesKind::Deaths))?);
        let (_, recovered_by_date) =
            reshape(&RawSeriesTable::load(config.source(SeriesKind::Recovered))?);
        let merged = merge(&cases_by_date, &deaths_by_date, &recovered_by_date)?;
        let geometry = GeometryTable::load(&config.countries_geometry)?;
        Self::new(cases, geometry, merged, today)
    }

    /// Sorted canonical names offered by the country selector.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.binary_search_by(|c| c.as_str().cmp(country)).is_ok()
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    pub fn clamp_date(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.end)
    }

    /// Min and max confirmed cases over the whole dataset, for the color scale.
    pub fn color_range(&self) -> Option<(f64, f64)> {
        self.cases.value_range()
    }

    pub fn merged(&self) -> &MergedCountryTable {
        &self.merged
    }

    pub fn geometry(&self) -> &GeometryTable {
        &self.geometry
    }

    fn map_update(&self, date: NaiveDate) -> MapUpdate {
        let label = dates::date_formatter(date);
        MapUpdate {
            date,
            title: format!("{MAP_TITLE}, {}", date.format(DISPLAY_FORMAT)),
            snapshot: build_snapshot(&self.cases, &self.geometry, &label),
        }
    }

    fn bar_update(&self, country: &str) -> BarUpdate {
        BarUpdate {
            country: country.to_string(),
            series: self.merged.slice(country),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardState {
    pub selected_date: NaiveDate,
    pub selected_country: String,
}

impl DashboardState {
    /// Yesterday and the default country, or the first known one if absent.
    pub fn initial(data: &DashboardData) -> Self {
        let selected_country = if data.contains_country(DEFAULT_COUNTRY) {
            DEFAULT_COUNTRY.to_string()
        } else {
            // Never empty, see `DashboardData::new`.
            data.countries.first().cloned().unwrap_or_default()
        };
        Self {
            selected_date: data.end,
            selected_country,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    DateChanged(NaiveDate),
    CountryChanged(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapUpdate {
    pub date: NaiveDate,
    pub title: String,
    pub snapshot: GeoSnapshot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarUpdate {
    pub country: String,
    pub series: CountrySeries,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewUpdate {
    Map(MapUpdate),
    Bar(BarUpdate),
}

/// Applies one event. Dates are clamped into range; unknown countries are rejected.
pub fn update(
    data: &DashboardData,
    state: &DashboardState,
    event: Event,
) -> Result<(DashboardState, ViewUpdate)> {
    match event {
        Event::DateChanged(date) => {
            let date = data.clamp_date(date);
            let next = DashboardState {
                selected_date: date,
                ..state.clone()
            };
            Ok((next, ViewUpdate::Map(data.map_update(date))))
        }
        Event::CountryChanged(country) => {
            if !data.contains_country(&country) {
                return Err(AtlasError::InvalidSelection { country });
            }
            let view = ViewUpdate::Bar(data.bar_update(&country));
            let next = DashboardState {
                selected_country: country,
                ..state.clone()
            };
            Ok((next, view))
        }
    }
}

/// Receives every view the controller publishes.
pub trait ViewListener {
    fn on_update(&mut self, update: &ViewUpdate);
}

pub struct Dashboard {
    data: DashboardData,
    state: DashboardState,
    map: MapUpdate,
    bar: BarUpdate,
    listeners: Vec<Box<dyn ViewListener>>,
}

impl Dashboard {
    pub fn new(data: DashboardData) -> Self {
        let state = DashboardState::initial(&data);
        let map = data.map_update(state.selected_date);
        let bar = data.bar_update(&state.selected_country);
        tracing::info!(
            date = %state.selected_date,
            country = %state.selected_country,
            countries = data.countries.len(),
            "Dashboard ready"
        );
        Self {
            data,
            state,
            map,
            bar,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ViewListener>) {
        self.listeners.push(listener);
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn map(&self) -> &MapUpdate {
        &self.map
    }

    pub fn bar(&self) -> &BarUpdate {
        &self.bar
    }

    /// Selects a date. Repeating the current date returns the cached view.
    pub fn set_date(&mut self, date: NaiveDate) -> &MapUpdate {
        if self.data.clamp_date(date) == self.state.selected_date {
            return &self.map;
        }
        match update(&self.data, &self.state, Event::DateChanged(date)) {
            Ok((state, ViewUpdate::Map(map))) => {
                tracing::debug!(date = %state.selected_date, "Date changed");
                self.state = state;
                self.map = map;
                self.publish(ViewUpdate::Map(self.map.clone()));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Date change ignored"),
        }
        &self.map
    }

    /// Moves the date by `days`, staying inside the slider range.
    pub fn step_date(&mut self, days: i64) -> &MapUpdate {
        let target = self
            .state
            .selected_date
            .checked_add_signed(TimeDelta::days(days))
            .unwrap_or(self.state.selected_date);
        self.set_date(target)
    }

    /// Selects a country; unknown names leave the state untouched.
    pub fn set_country(&mut self, country: &str) -> Result<&BarUpdate> {
        let (state, view) = update(&self.data, &self.state, Event::CountryChanged(country.to_string()))
            .inspect_err(|e| tracing::warn!(error = %e, "Country change rejected"))?;
        if let ViewUpdate::Bar(bar) = view {
            tracing::debug!(country = %state.selected_country, "Country changed");
            self.state = state;
            self.bar = bar;
            self.publish(ViewUpdate::Bar(self.bar.clone()));
        }
        Ok(&self.bar)
    }

    fn publish(&mut self, update: ViewUpdate) {
        for listener in &mut self.listeners {
            listener.on_update(&update);
        }
    }
}
