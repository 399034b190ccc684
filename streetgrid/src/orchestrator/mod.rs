//! Tiled aggregation of metadata queries
//!
//! Splits a region into fixed-zoom tiles, queries every tile that intersects
//! the region, keeps the records strictly inside the region and merges them
//! in tile order.

mod query;
mod types;

pub use crate::config::{FailurePolicy, TiledQueryConfig};
pub use query::TiledQuery;
pub use types::{OrchestratorError, TileFailure, TileMalformedRecord, TiledQueryReport};

#[cfg(test)]
mod tests;
