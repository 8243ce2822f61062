//! Data source configuration loaded from `configs/data_sources.json`.

use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AtlasError, Result};
use crate::series::SeriesKind;

pub const DEFAULT_CONFIG_PATH: &str = "configs/data_sources.json";
pub const DEFAULT_GEOMETRY_PATH: &str = "reference_data/countries.geojson";
pub const DEFAULT_LOG_FILE: &str = "covid_atlas.log";

#[derive(Debug, Deserialize)]
struct RawConfig {
    covid_19_cases: Option<String>,
    covid_19_deaths: Option<String>,
    covid_19_recovered: Option<String>,
    countries_geometry: Option<String>,
    log_file: Option<String>,
}

/// Resolved source locations. Relative paths are anchored at the config file's directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub cases: PathBuf,
    pub deaths: PathBuf,
    pub recovered: PathBuf,
    pub countries_geometry: PathBuf,
    pub log_file: PathBuf,
}

impl Config {
    /// Path of the CSV holding the given series.
    pub fn source(&self, kind: SeriesKind) -> &Path {
        match kind {
            SeriesKind::Cases => &self.cases,
            SeriesKind::Deaths => &self.deaths,
            SeriesKind::Recovered => &self.recovered,
        }
    }
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| AtlasError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig =
        serde_json::from_slice(&bytes).map_err(|source| AtlasError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let required = |value: Option<String>, kind: SeriesKind| -> Result<PathBuf> {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => resolve_location(base, &v),
            None => Err(AtlasError::MissingConfigKey {
                path: path.to_path_buf(),
                key: kind.config_key(),
            }),
        }
    };

    let config = Config {
        cases: required(raw.covid_19_cases, SeriesKind::Cases)?,
        deaths: required(raw.covid_19_deaths, SeriesKind::Deaths)?,
        recovered: required(raw.covid_19_recovered, SeriesKind::Recovered)?,
        countries_geometry: resolve_location(
            base,
            raw.countries_geometry.as_deref().unwrap_or(DEFAULT_GEOMETRY_PATH),
        )?,
        log_file: resolve_location(base, raw.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE))?,
    };
    Ok(config)
}

fn resolve_location(base: &Path, location: &str) -> Result<PathBuf> {
    let location = location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        return Err(AtlasError::SourceUnreachable {
            location: location.to_string(),
            reason: "remote sources are not supported, download the file first".to_string(),
        });
    }
    let candidate = PathBuf::from(location);
    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base.join(candidate))
    }
}
