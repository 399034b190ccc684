//! Geometry type definitions

use geo::{LineString, Polygon, Rect};
use thiserror::Error;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Axis order of a coordinate pair.
///
/// StreetGrid stores every coordinate as (lon, lat). `LatLon` only exists so
/// that callers with the opposite convention can ask for it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// x = longitude, y = latitude
    #[default]
    LonLat,
    /// x = latitude, y = longitude
    LatLon,
}

/// Errors raised by geometry helpers.
///
/// All variants are invalid-argument errors: they are raised before any I/O
/// and retrying with the same input will fail the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate was NaN or infinite
    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    /// Longitude is outside [-180, 180]
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// Latitude is outside [-90, 90]
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Radius was zero, negative or not finite
    #[error("Radius must be a positive number of meters, got {0}")]
    NonPositiveRadius(f64),

    /// Radius conversion is singular at the poles
    #[error("Cannot convert meters to degrees at latitude {0}: too close to a pole")]
    PolarLatitude(f64),

    /// Bounding box min is not strictly below max on some axis
    #[error(
        "Invalid bounding box ({min_lon}, {min_lat}, {max_lon}, {max_lat}): \
         min coordinates must be less than max coordinates"
    )]
    InvertedBounds {
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    },
}

/// Axis-aligned geographic bounding box in (lon, lat) order.
///
/// Construction validates the box, so a `BoundingBox` value always satisfies
/// `min < max` on both axes and lies within [-180,180]×[-90,90].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box from (minLon, minLat, maxLon, maxLat).
    pub fn new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, GeometryError> {
        for (name, value) in [
            ("min_lon", min_lon),
            ("min_lat", min_lat),
            ("max_lon", max_lon),
            ("max_lat", max_lat),
        ] {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite { name, value });
            }
        }
        for lon in [min_lon, max_lon] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(GeometryError::InvalidLongitude(lon));
            }
        }
        for lat in [min_lat, max_lat] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(GeometryError::InvalidLatitude(lat));
            }
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(GeometryError::InvertedBounds {
                min_lon,
                min_lat,
                max_lon,
                max_lat,
            });
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Creates a bounding box from the bounding rectangle of a (lon, lat) geometry.
    pub fn from_rect(rect: Rect<f64>) -> Result<Self, GeometryError> {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// Returns the (lon, lat) center of the box.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Returns the box as `(min_lat, min_lon, max_lat, max_lon)`.
    ///
    /// This is the argument order of [`crate::coord::tiles_covering_bbox`].
    pub fn to_lat_lon_order(&self) -> (f64, f64, f64, f64) {
        (self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }

    /// Formats the box as the `bbox` query parameter: `minLon,minLat,maxLon,maxLat`.
    pub fn to_query_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }

    /// Returns the box as a closed (lon, lat) rectangle polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.min_lon, self.min_lat),
                (self.max_lon, self.min_lat),
                (self.max_lon, self.max_lat),
                (self.min_lon, self.max_lat),
                (self.min_lon, self.min_lat),
            ]),
            vec![],
        )
    }
}

/// Geographic bounds of a map tile: (west, south, east, north) in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileBounds {
    /// Converts the tile bounds into a query bounding box.
    ///
    /// Tile bounds produced by [`crate::coord::TileCoord::bounds`] always lie
    /// within the Web Mercator extent, so this only fails for hand-built bounds.
    pub fn to_bbox(&self) -> Result<BoundingBox, GeometryError> {
        BoundingBox::new(self.west, self.south, self.east, self.north)
    }
}
