//! StreetGrid - Tiled spatial queries for street-level imagery metadata
//!
//! The image metadata API returns at most `limit` records per bounding box,
//! so a region of any size is queried as a grid of Web Mercator tiles. Each
//! tile that touches the region is queried on its own, its records are
//! projected to (lon, lat) points, clipped to the region and merged.
//!
//! # High-Level API
//!
//! ```ignore
//! use streetgrid::http::AsyncReqwestClient;
//! use streetgrid::metadata::MetadataClient;
//! use streetgrid::orchestrator::{TiledQuery, TiledQueryConfig};
//! use streetgrid::region::Region;
//!
//! let region = Region::radius(2.3522, 48.8566, 500.0)?;
//! let client = MetadataClient::new(AsyncReqwestClient::new()?);
//! let query = TiledQuery::new(client, TiledQueryConfig::default());
//!
//! let report = query.run(&region.to_polygon()?, &token).await?;
//! streetgrid::output::write_geojson(&report.records, "images.geojson".as_ref())?;
//! ```

pub mod config;
pub mod coord;
pub mod credentials;
pub mod download;
pub mod filter;
mod geojson;
pub mod geometry;
pub mod http;
pub mod logging;
pub mod metadata;
pub mod orchestrator;
pub mod output;
pub mod place;
pub mod record;
pub mod region;

/// Version of the StreetGrid library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
