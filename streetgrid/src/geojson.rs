//! Typed GeoJSON documents
//!
//! Only the members read back by this crate are modelled; anything else in
//! a document is ignored. Positions stay as plain number lists so that range
//! and arity checks can report which position is wrong.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A `[lon, lat, ...]` position.
pub(crate) type Position = Vec<f64>;

/// Geometry member of a feature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum Geometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Vec<Position>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub(crate) geometry: Option<Geometry>,
    #[serde(default)]
    pub(crate) properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub(crate) crs: Option<NamedCrs>,
    pub(crate) features: Vec<Feature>,
}

/// Legacy `{"type": "name", "properties": {"name": ...}}` CRS member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct NamedCrs {
    #[serde(default)]
    pub(crate) properties: Option<CrsProperties>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct CrsProperties {
    #[serde(default)]
    pub(crate) name: Option<String>,
}

impl NamedCrs {
    pub(crate) fn name(&self) -> Option<&str> {
        self.properties.as_ref()?.name.as_deref()
    }
}

/// Top-level document: a bare polygon, a feature or a collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum GeoJson {
    Polygon { coordinates: Vec<Vec<Position>> },
    Feature(Feature),
    FeatureCollection(FeatureCollection),
    #[serde(other)]
    Unsupported,
}

impl GeoJson {
    /// Parses a document held in a JSON value.
    pub(crate) fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        GeoJson::deserialize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection_members() {
        let value = json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:4326"}},
            "features": [{
                "type": "Feature",
                "id": 7,
                "properties": {"id": "1"},
                "geometry": {"type": "Point", "coordinates": [2.0, 48.0]}
            }]
        });

        let GeoJson::FeatureCollection(collection) = GeoJson::from_value(&value).unwrap() else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(collection.crs.as_ref().and_then(NamedCrs::name), Some("EPSG:4326"));
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point {
                coordinates: vec![2.0, 48.0]
            })
        );
    }

    #[test]
    fn test_unknown_types_are_unsupported() {
        let value = json!({"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0]]]]});
        assert_eq!(GeoJson::from_value(&value).unwrap(), GeoJson::Unsupported);

        let value = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]});
        assert_eq!(
            Geometry::deserialize(&value).unwrap(),
            Geometry::Unsupported
        );
    }

    #[test]
    fn test_missing_type_and_bad_numbers_are_errors() {
        assert!(GeoJson::from_value(&json!({"coordinates": []})).is_err());
        assert!(GeoJson::from_value(&json!({
            "type": "Polygon",
            "coordinates": [[[0.0, "x"]]]
        }))
        .is_err());
    }
}
