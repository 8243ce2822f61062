//! Country boundaries from a Natural Earth admin-0 GeoJSON file.

use geojson::{GeoJson, Geometry, Value};
use std::{fs, path::Path, str::FromStr};

use crate::country_names;
use crate::error::{AtlasError, Result};

pub const NAME_PROPERTY: &str = "ADMIN";
pub const CODE_PROPERTY: &str = "ADM0_A3";

#[derive(Clone, Debug, PartialEq)]
pub struct GeometryRow {
    pub country: String,
    pub country_code: String,
    pub geometry: Geometry,
}

/// One boundary per country, names already canonical.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryTable {
    rows: Vec<GeometryRow>,
}

impl GeometryTable {
    /// Builds a table, normalizing every country name.
    pub fn new(rows: Vec<GeometryRow>) -> Self {
        let names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        let canonical = country_names::normalize_all(&names);
        let rows = rows
            .into_iter()
            .zip(canonical)
            .map(|(row, country)| GeometryRow { country, ..row })
            .collect();
        Self { rows }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|e| AtlasError::SourceUnreachable {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let table = Self::parse(&txt, path)?;
        tracing::info!(path = %path.display(), countries = table.rows.len(), "Loaded country geometry");
        Ok(table)
    }

    /// Parses GeoJSON text. `path` is only used in error messages.
    pub fn parse(txt: &str, path: &Path) -> Result<Self> {
        let parse_err = |reason: String| AtlasError::GeometryParse {
            path: path.to_path_buf(),
            reason,
        };
        let raw = GeoJson::from_str(txt).map_err(|e| parse_err(e.to_string()))?;
        let GeoJson::FeatureCollection(fc) = raw else {
            return Err(parse_err("expected a FeatureCollection".to_string()));
        };

        let mut rows = Vec::with_capacity(fc.features.len());
        for feature in fc.features {
            let property = |key: &str| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(key).and_then(|v| v.as_str()))
                    .map(str::to_string)
            };
            let Some(country) = property(NAME_PROPERTY) else {
                tracing::warn!(path = %path.display(), "Skipping feature without {NAME_PROPERTY}");
                continue;
            };
            let country_code = property(CODE_PROPERTY).unwrap_or_default();
            let Some(geometry) = feature.geometry else {
                tracing::warn!(path = %path.display(), country = %country, "Skipping feature without geometry");
                continue;
            };
            if !matches!(geometry.value, Value::Polygon(_) | Value::MultiPolygon(_)) {
                tracing::warn!(path = %path.display(), country = %country, "Skipping non-areal feature");
                continue;
            }
            rows.push(GeometryRow {
                country,
                country_code,
                geometry,
            });
        }
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[GeometryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, de-duplicated canonical names.
    pub fn countries(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rows.iter().map(|r| r.country.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn square(x: f64, y: f64) -> Geometry {
        Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![x, y],
            vec![x + 1.0, y],
            vec![x + 1.0, y + 1.0],
            vec![x, y + 1.0],
            vec![x, y],
        ]]))
    }

    pub(crate) const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ADMIN": "Germany", "ADM0_A3": "DEU"},
             "geometry": {"type": "Polygon", "coordinates": [[[5,47],[15,47],[15,55],[5,55],[5,47]]]}},
            {"type": "Feature", "properties": {"ADMIN": "United States of America", "ADM0_A3": "USA"},
             "geometry": {"type": "Polygon", "coordinates": [[[-125,25],[-67,25],[-67,49],[-125,49],[-125,25]]]}},
            {"type": "Feature", "properties": {"ADMIN": "Nowhere"}, "geometry": null},
            {"type": "Feature", "properties": {"NAME": "Unnamed"},
             "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]
    }"#;

    #[test]
    fn test_parse_normalizes_names() {
        let table = GeometryTable::parse(SAMPLE, Path::new("countries.geojson")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].country, "United States");
        assert_eq!(table.rows()[1].country_code, "USA");
        assert_eq!(table.countries(), vec!["Germany", "United States"]);
    }

    #[test]
    fn test_parse_skips_non_areal_features() {
        let txt = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ADMIN": "Germany", "ADM0_A3": "DEU"},
                 "geometry": {"type": "Polygon", "coordinates": [[[5,47],[15,47],[15,55],[5,55],[5,47]]]}},
                {"type": "Feature", "properties": {"ADMIN": "Tuvalu", "ADM0_A3": "TUV"},
                 "geometry": {"type": "Point", "coordinates": [179.2, -8.5]}},
                {"type": "Feature", "properties": {"ADMIN": "Border", "ADM0_A3": "XXX"},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
            ]
        }"#;
        let table = GeometryTable::parse(txt, Path::new("countries.geojson")).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.countries(), vec!["Germany"]);
    }

    #[test]
    fn test_parse_rejects_non_collection() {
        let txt = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        let result = GeometryTable::parse(txt, Path::new("point.geojson"));
        assert!(matches!(result, Err(AtlasError::GeometryParse { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = GeometryTable::load("/definitely/not/here.geojson");
        assert!(matches!(result, Err(AtlasError::SourceUnreachable { .. })));
    }

    #[test]
    fn test_new_dedups_country_list() {
        let table = GeometryTable::new(vec![
            GeometryRow { country: "France".into(), country_code: "FRA".into(), geometry: square(0.0, 0.0) },
            GeometryRow { country: "FRA".into(), country_code: "FRA".into(), geometry: square(2.0, 0.0) },
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.countries(), vec!["France"]);
    }
}
