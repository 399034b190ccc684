//! Tiled query report and error types

use thiserror::Error;

use crate::coord::{CoordError, TileCoord};
use crate::geometry::GeometryError;
use crate::metadata::QueryError;
use crate::output::OutputError;
use crate::record::{MalformedRecord, ResultSet};

/// Errors that stop a tiled query.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The region, configuration or token is invalid; nothing was queried
    /// or the first query rejected its arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A tile query failed under [`FailurePolicy::Abort`](crate::config::FailurePolicy::Abort)
    #[error("Query for tile {tile} failed: {source}")]
    Query {
        tile: TileCoord,
        #[source]
        source: QueryError,
    },

    /// The run was cancelled through its cancellation token
    #[error("Tiled query cancelled")]
    Cancelled,

    /// The merged result could not be written
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl From<CoordError> for OrchestratorError {
    fn from(e: CoordError) -> Self {
        OrchestratorError::InvalidArgument(e.to_string())
    }
}

impl From<GeometryError> for OrchestratorError {
    fn from(e: GeometryError) -> Self {
        OrchestratorError::InvalidArgument(e.to_string())
    }
}

/// A tile whose query failed and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFailure {
    pub tile: TileCoord,
    pub error: QueryError,
}

/// A record dropped from a tile because its geometry was unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMalformedRecord {
    pub tile: TileCoord,
    pub record: MalformedRecord,
}

/// Outcome of a tiled query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TiledQueryReport {
    /// Merged records, in tile order, inside the region
    pub records: ResultSet,
    /// Tiles covering the region's bounding box
    pub tiles_total: usize,
    /// Tiles disjoint from the region, never queried
    pub tiles_skipped: usize,
    /// Tiles for which a query was issued
    pub tiles_queried: usize,
    /// Tiles whose result hit the record limit
    pub truncated_tiles: Vec<TileCoord>,
    /// Tiles skipped after a failed query
    pub failed_tiles: Vec<TileFailure>,
    pub malformed_records: Vec<TileMalformedRecord>,
    /// Records dropped because an earlier tile returned the same id
    pub duplicates_removed: usize,
}

impl TiledQueryReport {
    /// True when no tile failed and none was truncated.
    pub fn is_complete(&self) -> bool {
        self.failed_tiles.is_empty() && self.truncated_tiles.is_empty()
    }
}
