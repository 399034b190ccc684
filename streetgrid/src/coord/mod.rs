//! Coordinate conversion and tile grid generation
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, and enumerates the tiles covering a
//! bounding box.

mod types;

pub use types::{
    CoordError, TileCoord, TileRange, DEFAULT_ZOOM, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use crate::geometry::BoundingBox;
use std::f64::consts::PI;

/// Inward nudge applied to every side of a bbox so that a box lying exactly
/// on tile edges does not pull in the neighbouring tiles.
const EDGE_EPSILON: f64 = 1e-11;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 24)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(tile_containing(lat, lon, zoom))
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.col as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = tile.row as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Returns every tile at `zoom` whose bounds intersect the given bbox.
///
/// Tiles are returned in row-major order (north to south, then west to
/// east), so the same input always yields the same sequence. See
/// [`tile_range_covering_bbox`] for the edge rules; use it directly when the
/// grid may be too large to collect.
///
/// # Errors
///
/// Same as [`tile_range_covering_bbox`].
pub fn tiles_covering_bbox(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u8,
) -> Result<Vec<TileCoord>, CoordError> {
    let range = tile_range_covering_bbox(min_lat, min_lon, max_lat, max_lon, zoom)?;
    Ok(range.iter().collect())
}

/// Returns the block of tiles at `zoom` whose bounds intersect the given
/// bbox, without generating them.
///
/// Latitudes beyond the Web Mercator limit are clamped to it. A bbox side
/// lying exactly on a tile edge does not pull in the tile beyond that edge.
///
/// # Errors
///
/// Returns an error for non-finite or inverted bounds, longitudes outside
/// [-180, 180], latitudes outside [-90, 90], or an unsupported zoom level.
pub fn tile_range_covering_bbox(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    zoom: u8,
) -> Result<TileRange, CoordError> {
    let finite = [min_lat, min_lon, max_lat, max_lon]
        .iter()
        .all(|v| v.is_finite());
    if !finite || min_lat > max_lat || min_lon > max_lon {
        return Err(CoordError::InvalidBounds {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        });
    }
    for lon in [min_lon, max_lon] {
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }
    }
    for lat in [min_lat, max_lat] {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let north = max_lat.min(MAX_LAT);
    let south = min_lat.max(MIN_LAT);

    let upper_left = tile_containing(
        (north - EDGE_EPSILON).max(south),
        (min_lon + EDGE_EPSILON).min(max_lon),
        zoom,
    );
    let lower_right = tile_containing(
        (south + EDGE_EPSILON).min(north),
        (max_lon - EDGE_EPSILON).max(min_lon),
        zoom,
    );

    Ok(TileRange {
        min_row: upper_left.row,
        max_row: lower_right.row,
        min_col: upper_left.col,
        max_col: lower_right.col,
        zoom,
    })
}

/// Returns every tile at `zoom` intersecting a validated bounding box.
pub fn tiles_covering(bbox: &BoundingBox, zoom: u8) -> Result<Vec<TileCoord>, CoordError> {
    let (min_lat, min_lon, max_lat, max_lon) = bbox.to_lat_lon_order();
    tiles_covering_bbox(min_lat, min_lon, max_lat, max_lon, zoom)
}

/// Tile containing a point, with indices clamped to the grid.
///
/// Callers validate ranges; points on the east or south world edge map to
/// the last column or row instead of falling off the grid.
fn tile_containing(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let col = ((lon + 180.0) / 360.0 * n).floor().clamp(0.0, max_index) as u32;

    let lat_rad = lat * PI / 180.0;
    let row = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, max_index) as u32;

    TileCoord { row, col, zoom }
}
