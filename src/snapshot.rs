//! Per-date map data: country boundaries joined with that day's counts.

use std::collections::HashMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use crate::geometry::GeometryTable;
use crate::series::TidySeriesTable;

/// Display text for a country with no value on the selected date.
pub const NO_DATA: &str = "No data";

#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotFeature {
    pub country: String,
    pub country_code: String,
    /// `None` when the join found nothing.
    pub value: Option<f64>,
    pub geometry: Geometry,
}

impl SnapshotFeature {
    pub fn display_value(&self) -> String {
        match self.value {
            Some(v) => format!("{v:.0}"),
            None => NO_DATA.to_string(),
        }
    }
}

/// Every geometry row with its value for one date label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoSnapshot {
    pub date_label: String,
    pub features: Vec<SnapshotFeature>,
}

impl GeoSnapshot {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature(&self, country: &str) -> Option<&SnapshotFeature> {
        self.features.iter().find(|f| f.country == country)
    }

    /// GeoJSON for the map layer. Missing values are written as `null`.
    ///
    /// This is the snapshot's interchange format for renderers outside this
    /// crate. The terminal map reads [`GeoSnapshot::features`] directly.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|f| {
                let mut properties = JsonObject::new();
                properties.insert("country".to_string(), JsonValue::from(f.country.clone()));
                properties.insert("country_code".to_string(), JsonValue::from(f.country_code.clone()));
                properties.insert(
                    "value".to_string(),
                    f.value.map_or(JsonValue::Null, JsonValue::from),
                );
                Feature {
                    bbox: None,
                    geometry: Some(f.geometry.clone()),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Left-joins the geometry table with the tidy rows whose label equals `date_label`.
///
/// Never fails: a label with no rows yields a snapshot where every value is `None`.
pub fn build_snapshot(tidy: &TidySeriesTable, geometry: &GeometryTable, date_label: &str) -> GeoSnapshot {
    let values: HashMap<&str, Option<f64>> = tidy
        .for_date(date_label)
        .map(|row| (row.country.as_str(), row.value))
        .collect();

    let features: Vec<SnapshotFeature> = geometry
        .rows()
        .iter()
        .map(|row| SnapshotFeature {
            country: row.country.clone(),
            country_code: row.country_code.clone(),
            value: values.get(row.country.as_str()).copied().flatten(),
            geometry: row.geometry.clone(),
        })
        .collect();

    let matched = features.iter().filter(|f| f.value.is_some()).count();
    tracing::debug!(date = date_label, features = features.len(), matched, "Built map snapshot");

    GeoSnapshot {
        date_label: date_label.to_string(),
        features,
    }
}
