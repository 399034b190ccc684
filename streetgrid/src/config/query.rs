//! Tiled query configuration.

use std::fmt;
use std::str::FromStr;

use super::defaults::{DEFAULT_CONCURRENCY, DEFAULT_DEDUP, DEFAULT_MAX_TILES};
use crate::coord::DEFAULT_ZOOM;
use crate::metadata::{default_fields, DEFAULT_LIMIT};

/// What a tiled query does when one tile fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failing tile aborts the whole run
    #[default]
    Abort,
    /// Failing tiles are recorded in the report and the run continues
    SkipAndReport,
}

impl FailurePolicy {
    /// Name used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::SkipAndReport => "skip",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" | "skip_and_report" => Ok(FailurePolicy::SkipAndReport),
            other => Err(format!("unknown failure policy '{}' (expected abort or skip)", other)),
        }
    }
}

/// Configuration for a tiled metadata query.
///
/// # Example
///
/// ```
/// use streetgrid::config::{FailurePolicy, TiledQueryConfig};
///
/// // Using defaults
/// let config = TiledQueryConfig::default();
/// assert_eq!(config.zoom(), 18);
/// assert_eq!(config.limit(), 5000);
/// assert_eq!(config.concurrency(), 4);
///
/// // Custom configuration
/// let config = TiledQueryConfig::new()
///     .with_zoom(20)
///     .with_concurrency(1)
///     .with_failure_policy(FailurePolicy::SkipAndReport);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledQueryConfig {
    /// Tile zoom level used to split the region
    zoom: u8,
    /// Per-tile record limit
    limit: u32,
    /// Requested API fields
    fields: Vec<String>,
    /// Maximum number of tile queries in flight
    concurrency: usize,
    failure_policy: FailurePolicy,
    /// Drop records whose id was already seen in an earlier tile
    dedup: bool,
    /// Regions covering more tiles than this are rejected before querying
    max_tiles: u64,
}

impl Default for TiledQueryConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            limit: DEFAULT_LIMIT,
            fields: default_fields(),
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
            dedup: DEFAULT_DEDUP,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }
}

impl TiledQueryConfig {
    /// Create a new query configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tile zoom level.
    ///
    /// Higher zoom means smaller tiles and more queries, which is the remedy
    /// when tiles come back truncated. Default: 18.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the per-tile record limit. Default: 5000.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the requested fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Set the maximum number of concurrent tile queries.
    ///
    /// Values below 1 are raised to 1, which queries tiles sequentially.
    /// Default: 4.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Enable or disable de-duplication by record id. Default: enabled.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Set the largest tile grid a query may cover. Default: 10000.
    pub fn with_max_tiles(mut self, max_tiles: u64) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn dedup(&self) -> bool {
        self.dedup
    }

    pub fn max_tiles(&self) -> u64 {
        self.max_tiles
    }
}
