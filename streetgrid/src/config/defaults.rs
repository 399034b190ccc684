//! Default values for configuration settings.

use std::path::PathBuf;

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".streetgrid";

/// Name of the configuration file inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default number of tile queries in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Maximum accepted concurrency.
pub const MAX_CONCURRENCY: usize = 64;

/// Default ceiling on the number of tiles one query may cover.
///
/// Ten thousand zoom-18 tiles is roughly a 15 km square at the equator.
pub const DEFAULT_MAX_TILES: u64 = 10_000;

/// De-duplicate records by id unless configured otherwise.
pub const DEFAULT_DEDUP: bool = true;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = crate::http::DEFAULT_TIMEOUT_SECS;

/// Default pause after each image download, in milliseconds.
pub const DEFAULT_COOLDOWN_MS: u64 = 1000;

/// Default token file, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "mapillary_token";

/// Default log file name.
pub const DEFAULT_LOG_FILE_NAME: &str = "streetgrid.log";

/// Default log file path (~/.streetgrid/streetgrid.log).
pub fn default_log_file() -> PathBuf {
    super::file::config_directory().join(DEFAULT_LOG_FILE_NAME)
}
