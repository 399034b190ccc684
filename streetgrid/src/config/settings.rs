//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use super::defaults::*;
use super::query::{FailurePolicy, TiledQueryConfig};
use crate::coord::DEFAULT_ZOOM;
use crate::metadata::{default_fields, DEFAULT_LIMIT, DEFAULT_METADATA_URL};
use crate::place::DEFAULT_PLACE_URL;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// API endpoints and credentials
    pub api: ApiSettings,
    /// Tiled query settings
    pub query: QuerySettings,
    /// Image download settings
    pub download: DownloadSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// API configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    /// Access token; environment variables and the token file take precedence
    pub access_token: Option<String>,
    /// File whose first line holds the access token
    pub token_file: PathBuf,
    /// Metadata API endpoint
    pub metadata_url: String,
    /// Place search endpoint
    pub place_url: String,
    /// HTTP timeout in seconds
    pub timeout: u64,
    /// Per-request record limit
    pub limit: u32,
}

/// Tiled query configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    pub zoom: u8,
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub dedupe: bool,
    pub fields: Vec<String>,
    /// Largest tile grid a single query may cover
    pub max_tiles: u64,
}

/// Image download configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    /// Pause after each download, in milliseconds
    pub cooldown_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                access_token: None,
                token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
                metadata_url: DEFAULT_METADATA_URL.to_string(),
                place_url: DEFAULT_PLACE_URL.to_string(),
                timeout: DEFAULT_TIMEOUT_SECS,
                limit: DEFAULT_LIMIT,
            },
            query: QuerySettings {
                zoom: DEFAULT_ZOOM,
                concurrency: DEFAULT_CONCURRENCY,
                failure_policy: FailurePolicy::default(),
                dedupe: DEFAULT_DEDUP,
                fields: default_fields(),
                max_tiles: DEFAULT_MAX_TILES,
            },
            download: DownloadSettings {
                cooldown_ms: DEFAULT_COOLDOWN_MS,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

impl ConfigFile {
    /// Builds the tiled query configuration described by this file.
    pub fn tiled_query_config(&self) -> TiledQueryConfig {
        TiledQueryConfig::new()
            .with_zoom(self.query.zoom)
            .with_limit(self.api.limit)
            .with_fields(self.query.fields.clone())
            .with_concurrency(self.query.concurrency)
            .with_failure_policy(self.query.failure_policy)
            .with_dedup(self.query.dedupe)
            .with_max_tiles(self.query.max_tiles)
    }
}
