//! Coordinate type definitions

use crate::geometry::TileBounds;
use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom levels.
///
/// Zoom 18 is the default query grid; deeper levels exist so that truncated
/// tiles can be re-queried on a finer grid.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 24;

/// Default zoom level for tiled metadata queries.
///
/// At zoom 18 a tile is roughly 150 m wide at the equator, which keeps the
/// per-tile image count of dense urban areas below the API page ceiling.
pub const DEFAULT_ZOOM: u8 = 18;

/// Tile coordinates in the Web Mercator / Slippy Map system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Zoom level
    pub zoom: u8,
}

impl TileCoord {
    /// Returns the geographic bounds of this tile.
    pub fn bounds(&self) -> TileBounds {
        let (north, west) = super::tile_to_lat_lon(self);
        let (south, east) = super::tile_to_lat_lon(&TileCoord {
            row: self.row + 1,
            col: self.col + 1,
            zoom: self.zoom,
        });

        TileBounds {
            west,
            south,
            east,
            north,
        }
    }
}

/// Rectangular block of tiles at one zoom level, bounds inclusive.
///
/// Describes a tile grid without materializing it; [`TileRange::len`] is
/// available before any tile is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
    pub zoom: u8,
}

impl TileRange {
    pub fn rows(&self) -> u64 {
        u64::from(self.max_row - self.min_row) + 1
    }

    pub fn cols(&self) -> u64 {
        u64::from(self.max_col - self.min_col) + 1
    }

    /// Number of tiles in the range.
    pub fn len(&self) -> u64 {
        self.rows() * self.cols()
    }

    /// Always false: a range holds at least one tile.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tiles in row-major order (north to south, then west to east).
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> {
        let TileRange {
            min_row,
            max_row,
            min_col,
            max_col,
            zoom,
        } = *self;
        (min_row..=max_row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| TileCoord { row, col, zoom }))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-85.05112878 to 85.05112878)
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// Zoom level is outside valid range
    InvalidZoom(u8),
    /// Bounding box is not finite or min is not below max
    InvalidBounds {
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    },
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::InvalidBounds {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            } => {
                write!(
                    f,
                    "Invalid bounds (lat {}..{}, lon {}..{}): values must be finite and min < max",
                    min_lat, max_lat, min_lon, max_lon
                )
            }
        }
    }
}

impl std::error::Error for CoordError {}
