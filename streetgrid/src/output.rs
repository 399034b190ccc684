//! JSON and GeoJSON persistence
//!
//! Result sets are written as a GeoJSON FeatureCollection of Points carrying
//! a named CRS member for EPSG:4326. Raw API responses and place polygons are
//! written as pretty-printed JSON.

use geo::Point;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::geojson::{Feature, GeoJson, Geometry, NamedCrs};
use crate::record::{ImageRecord, ResultSet, CRS};

/// URN of the result CRS, as written to GeoJSON.
pub const CRS_URN: &str = "urn:ogc:def:crs:EPSG::4326";

/// Persistence errors.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File could not be read, written or its directory created
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be (de)serialized
    #[error("Invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON was valid but not a FeatureCollection of Points
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}

/// Writes any serializable value as pretty JSON (4-space indent, UTF-8,
/// non-ASCII characters kept as is). Parent directories are created.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), OutputError> {
    create_parent_dir(path)?;

    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| OutputError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    fs::write(path, buffer).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Reads a JSON document.
pub fn read_json(path: &Path) -> Result<Value, OutputError> {
    let content = fs::read_to_string(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a result set as a GeoJSON FeatureCollection.
pub fn write_geojson(records: &ResultSet, path: &Path) -> Result<(), OutputError> {
    write_json(&to_feature_collection(records), path)
}

/// Reads a GeoJSON FeatureCollection of Points back into a result set.
pub fn read_geojson(path: &Path) -> Result<ResultSet, OutputError> {
    from_feature_collection(&read_json(path)?)
}

/// Converts a result set into a GeoJSON FeatureCollection value.
pub fn to_feature_collection(records: &ResultSet) -> Value {
    let features: Vec<Value> = records
        .iter()
        .map(|record| {
            json!({
                "type": "Feature",
                "properties": Value::Object(record.properties().clone()),
                "geometry": {
                    "type": "Point",
                    "coordinates": [record.lon(), record.lat()],
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": CRS_URN },
        },
        "features": features,
    })
}

/// Converts a GeoJSON FeatureCollection of Points into a result set.
pub fn from_feature_collection(value: &Value) -> Result<ResultSet, OutputError> {
    let document = GeoJson::from_value(value).map_err(|e| invalid(&e.to_string()))?;
    let GeoJson::FeatureCollection(collection) = document else {
        return Err(invalid("expected a FeatureCollection"));
    };

    if let Some(name) = collection.crs.as_ref().and_then(NamedCrs::name) {
        if name != CRS_URN && name != CRS {
            return Err(invalid(&format!("unsupported CRS '{}'", name)));
        }
    }

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| feature_to_record(index, feature))
        .collect()
}

fn feature_to_record(index: usize, feature: Feature) -> Result<ImageRecord, OutputError> {
    let Some(Geometry::Point { coordinates }) = feature.geometry else {
        return Err(invalid(&format!("feature {} has no Point geometry", index)));
    };
    let &[lon, lat, ..] = coordinates.as_slice() else {
        return Err(invalid(&format!("feature {} has no coordinates", index)));
    };

    let properties = feature.properties.unwrap_or_default();
    Ok(ImageRecord::new(properties, Point::new(lon, lat)))
}

fn create_parent_dir(path: &Path) -> Result<(), OutputError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| OutputError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn invalid(reason: &str) -> OutputError {
    OutputError::InvalidGeoJson(reason.to_string())
}
