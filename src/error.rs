//! Error types for loading sources and driving the dashboard.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the dashboard sources or handling a selection.
///
/// Everything except [`AtlasError::InvalidSelection`] is fatal at startup.
#[derive(Debug, Error)]
pub enum AtlasError {
    // === Configuration ===
    /// Config file missing or unreadable.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("malformed config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Required config key absent or empty.
    #[error("config {path} is missing required key '{key}'")]
    MissingConfigKey { path: PathBuf, key: &'static str },

    // === Sources ===
    /// A CSV or geometry source could not be opened.
    #[error("source unreachable: {location}: {reason}")]
    SourceUnreachable { location: String, reason: String },

    /// Malformed CSV content.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required column not present in a source header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A date column label that is not `M/D/YY`.
    #[error("invalid date label '{label}'")]
    InvalidDateLabel { label: String },

    /// Geometry file is not a usable GeoJSON feature collection.
    #[error("failed to parse geometry {path}: {reason}")]
    GeometryParse { path: PathBuf, reason: String },

    /// Geometry source produced no country boundaries.
    #[error("no country boundaries loaded")]
    EmptyGeometry,

    // === Interaction ===
    /// Selected country is not in the known country list.
    #[error("unknown country '{country}'")]
    InvalidSelection { country: String },
}

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AtlasError::MissingConfigKey {
            path: PathBuf::from("configs/data_sources.json"),
            key: "covid_19_cases",
        };
        assert_eq!(
            err.to_string(),
            "config configs/data_sources.json is missing required key 'covid_19_cases'"
        );
    }

    #[test]
    fn test_invalid_selection_display() {
        let err = AtlasError::InvalidSelection {
            country: "Atlantis".to_string(),
        };
        assert_eq!(err.to_string(), "unknown country 'Atlantis'");
    }
}
