//! Geometry utilities
//!
//! Meter/degree conversions, bounding box construction and conversion of tile
//! bounds into polygons. Every coordinate handled by StreetGrid is stored in
//! (lon, lat) order; the only places where the axis order is flipped are the
//! explicitly named functions in this module.

mod types;

pub use types::{
    AxisOrder, BoundingBox, GeometryError, TileBounds, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

use geo::{LineString, Polygon};
use std::f64::consts::PI;

/// Approximate length of one degree of latitude, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Below this value of `cos(lat)` the meter/degree conversion is treated as singular.
const POLE_EPSILON: f64 = 1e-9;

/// Converts a radius in meters to degrees of longitude at the given latitude.
///
/// Uses a flat approximation (`111320 m` per degree scaled by `cos(lat)`),
/// which is only meaningful for radii where the earth's curvature is
/// negligible.
///
/// # Errors
///
/// Returns [`GeometryError::PolarLatitude`] when the latitude is so close to a
/// pole that the conversion would divide by (almost) zero.
pub fn radius_to_degrees(radius_m: f64, lat: f64) -> Result<f64, GeometryError> {
    let scale = (lat * PI / 180.0).cos();
    if scale.abs() < POLE_EPSILON {
        return Err(GeometryError::PolarLatitude(lat));
    }
    Ok(radius_m / (METERS_PER_DEGREE * scale))
}

/// Converts a distance in degrees back to meters at the given latitude.
///
/// Inverse of [`radius_to_degrees`].
pub fn degrees_to_radius(degrees: f64, lat: f64) -> f64 {
    degrees * METERS_PER_DEGREE * (lat * PI / 180.0).cos()
}

/// Builds a square bounding box centered on `(lon, lat)`.
///
/// The half-width of the square is `radius_to_degrees(radius_m, lat)` on both
/// axes. Sides that would leave the world extent are clamped to it while the
/// opposite sides keep their distance from the center, so a clamped box is no
/// longer centered on `(lon, lat)`. Boxes never wrap across the antimeridian.
///
/// # Errors
///
/// Invalid-argument errors for out-of-range or non-finite coordinates, a
/// radius that is not strictly positive, or a latitude at a pole.
pub fn bounding_box_from_center_radius(
    lon: f64,
    lat: f64,
    radius_m: f64,
) -> Result<BoundingBox, GeometryError> {
    if !lon.is_finite() {
        return Err(GeometryError::NonFinite {
            name: "lon",
            value: lon,
        });
    }
    if !lat.is_finite() {
        return Err(GeometryError::NonFinite {
            name: "lat",
            value: lat,
        });
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(GeometryError::InvalidLongitude(lon));
    }
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(GeometryError::InvalidLatitude(lat));
    }
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeometryError::NonPositiveRadius(radius_m));
    }

    let half_width = radius_to_degrees(radius_m, lat)?;

    BoundingBox::new(
        (lon - half_width).max(MIN_LON),
        (lat - half_width).max(MIN_LAT),
        (lon + half_width).min(MAX_LON),
        (lat + half_width).min(MAX_LAT),
    )
}

/// Converts tile bounds into a closed rectangular polygon.
///
/// With [`AxisOrder::LonLat`] the polygon's x axis is longitude; with
/// [`AxisOrder::LatLon`] it is latitude. The polygon must be compared against
/// geometries of the same order, otherwise intersection tests silently give
/// wrong answers.
pub fn tile_bounds_to_polygon(bounds: &TileBounds, order: AxisOrder) -> Polygon<f64> {
    let (min_x, min_y, max_x, max_y) = match order {
        AxisOrder::LonLat => (bounds.west, bounds.south, bounds.east, bounds.north),
        AxisOrder::LatLon => (bounds.south, bounds.west, bounds.north, bounds.east),
    };

    Polygon::new(
        LineString::from(vec![
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ]),
        vec![],
    )
}

/// Builds a (lon, lat) bounding box from bounds given in (lat, lon) order.
///
/// Counterpart of [`BoundingBox::to_lat_lon_order`].
pub fn to_lon_lat_order(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
) -> Result<BoundingBox, GeometryError> {
    BoundingBox::new(min_lon, min_lat, max_lon, max_lat)
}
