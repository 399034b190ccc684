//! Query regions
//!
//! A region is either an arbitrary polygon or a center point with a radius.
//! Both end up as a (lon, lat) polygon that bounds the tiled query.

use geo::{Coord, LineString, Polygon};
use serde_json::{json, Value};
use thiserror::Error;

use crate::geojson::{GeoJson, Geometry, Position};
use crate::geometry::{bounding_box_from_center_radius, BoundingBox, GeometryError};

/// Errors raised while building a region.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// The region parameters are out of range
    #[error(transparent)]
    InvalidArgument(#[from] GeometryError),

    /// A GeoJSON document did not describe a usable polygon
    #[error("Invalid GeoJSON polygon: {0}")]
    InvalidGeoJson(String),
}

/// Geographic area to query.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    /// Polygon in (lon, lat) order
    Polygon(Polygon<f64>),
    /// Square of half-width `radius_m` around a center point
    Radius { lon: f64, lat: f64, radius_m: f64 },
}

impl Region {
    /// Creates a radius region, validating the center and radius.
    pub fn radius(lon: f64, lat: f64, radius_m: f64) -> Result<Self, RegionError> {
        bounding_box_from_center_radius(lon, lat, radius_m)?;
        Ok(Region::Radius { lon, lat, radius_m })
    }

    /// Creates a polygon region from a GeoJSON document.
    pub fn from_geojson(value: &Value) -> Result<Self, RegionError> {
        polygon_from_geojson(value).map(Region::Polygon)
    }

    /// Bounding box of a radius region.
    ///
    /// Returns `None` for polygon regions, whose extent may be degenerate.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>, RegionError> {
        match self {
            Region::Polygon(_) => Ok(None),
            Region::Radius { lon, lat, radius_m } => {
                Ok(Some(bounding_box_from_center_radius(*lon, *lat, *radius_m)?))
            }
        }
    }

    /// The region as a (lon, lat) polygon.
    pub fn to_polygon(&self) -> Result<Polygon<f64>, RegionError> {
        match self {
            Region::Polygon(polygon) => Ok(polygon.clone()),
            Region::Radius { lon, lat, radius_m } => {
                Ok(bounding_box_from_center_radius(*lon, *lat, *radius_m)?.to_polygon())
            }
        }
    }
}

/// Reads a polygon from a GeoJSON Polygon geometry, a Feature holding one,
/// or the first feature of a FeatureCollection.
///
/// Positions are read as `[lon, lat]`. Rings are closed if needed.
pub fn polygon_from_geojson(value: &Value) -> Result<Polygon<f64>, RegionError> {
    let document = GeoJson::from_value(value).map_err(|e| invalid(&e.to_string()))?;

    let geometry = match document {
        GeoJson::Polygon { coordinates } => return polygon_from_rings(&coordinates),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .next()
            .ok_or_else(|| invalid("FeatureCollection has no features"))?
            .geometry,
        GeoJson::Unsupported => {
            return Err(invalid(
                "expected a Polygon, Feature or FeatureCollection",
            ))
        }
    };

    match geometry {
        Some(Geometry::Polygon { coordinates }) => polygon_from_rings(&coordinates),
        Some(_) => Err(invalid("feature geometry is not a Polygon")),
        None => Err(invalid("feature has no geometry")),
    }
}

/// Writes a polygon as a GeoJSON Polygon geometry.
pub fn polygon_to_geojson(polygon: &Polygon<f64>) -> Value {
    let ring = |line: &LineString<f64>| -> Vec<[f64; 2]> {
        line.coords().map(|c| [c.x, c.y]).collect()
    };
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));

    json!({
        "type": "Polygon",
        "coordinates": rings,
    })
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Polygon<f64>, RegionError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| invalid("Polygon has no rings"))?;

    let exterior = ring_from_positions(exterior)?;
    let interiors = interiors
        .iter()
        .map(|ring| ring_from_positions(ring))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: &[Position]) -> Result<LineString<f64>, RegionError> {
    let coords = positions
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] if (-180.0..=180.0).contains(x) && (-90.0..=90.0).contains(y) => {
                Ok(Coord { x: *x, y: *y })
            }
            [_, _, ..] => Err(invalid(&format!("position {:?} is out of range", position))),
            _ => Err(invalid("position is not a [lon, lat] pair")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if coords.len() < 3 {
        return Err(invalid("ring needs at least 3 positions"));
    }

    // Polygon::new closes open rings
    Ok(LineString::new(coords))
}

fn invalid(reason: &str) -> RegionError {
    RegionError::InvalidGeoJson(reason.to_string())
}
