//! COVID-19 time-series dashboard core.
//!
//! Loads Johns Hopkins style case, death and recovered tables plus Natural
//! Earth country boundaries, and derives the views the terminal dashboard
//! renders:
//!
//! - [`snapshot::build_snapshot`]: one date's counts joined onto every country boundary
//! - [`merge::merge`]: the three series on one calendar index, sliced per country
//! - [`dashboard::Dashboard`]: selected date and country, with listeners for view updates
//!
//! External renderers take [`snapshot::GeoSnapshot::to_feature_collection`]
//! and [`merge::CountrySeries::to_column_source`]; the bundled terminal UI
//! draws from the typed views.

pub mod config;
pub mod country_names;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod geometry;
pub mod merge;
pub mod series;
pub mod snapshot;

pub use error::{AtlasError, Result};
