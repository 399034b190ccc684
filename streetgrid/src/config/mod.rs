//! Configuration for StreetGrid.
//!
//! Two layers:
//!
//! - [`TiledQueryConfig`]: builder-style parameters of one tiled query
//! - [`ConfigFile`]: the user's `~/.streetgrid/config.ini`, from which a
//!   `TiledQueryConfig` and the API/download/logging settings are derived
//!
//! # Example
//!
//! ```
//! use streetgrid::config::{ConfigFile, TiledQueryConfig};
//!
//! let from_file = ConfigFile::default().tiled_query_config();
//! assert_eq!(from_file, TiledQueryConfig::default());
//! ```

mod defaults;
mod file;
mod parser;
mod query;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use query::{FailurePolicy, TiledQueryConfig};
pub use settings::{ApiSettings, ConfigFile, DownloadSettings, LoggingSettings, QuerySettings};
