//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use streetgrid::config::{ConfigFileError, CONFIG_DIR_NAME};
use streetgrid::credentials::TOKEN_ENV_VARS;
use streetgrid::download::DownloadError;
use streetgrid::http::HttpError;
use streetgrid::metadata::QueryError;
use streetgrid::orchestrator::OrchestratorError;
use streetgrid::output::OutputError;
use streetgrid::place::PlaceError;
use streetgrid::region::RegionError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// No access token found anywhere
    MissingToken,
    /// Bad command-line input
    InvalidArgument(String),
    /// Failed to start the async runtime or HTTP client
    Runtime(String),
    /// Tiled query failed
    Query(OrchestratorError),
    /// Single bbox query failed
    Metadata(QueryError),
    /// Place lookup failed
    Place(PlaceError),
    /// Region could not be built
    Region(RegionError),
    /// Reading or writing a result file failed
    Output(OutputError),
    /// Image download could not start
    Download(DownloadError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::MissingToken => {
                eprintln!();
                eprintln!("Provide an access token in one of these ways:");
                eprintln!("  1. Pass --token <TOKEN>");
                eprintln!("  2. Set one of: {}", TOKEN_ENV_VARS.join(", "));
                eprintln!("  3. Put it on the first line of the token file (default: mapillary_token)");
                eprintln!(
                    "  4. Set access_token in ~/{}/config.ini",
                    CONFIG_DIR_NAME
                );
            }
            CliError::Query(OrchestratorError::Query { .. }) => {
                eprintln!();
                eprintln!("Use --skip-failed-tiles to keep going past failing tiles.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::MissingToken => write!(f, "No API access token found"),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(msg) => write!(f, "Failed to start: {}", msg),
            CliError::Query(e) => write!(f, "Tiled query failed: {}", e),
            CliError::Metadata(e) => write!(f, "Metadata query failed: {}", e),
            CliError::Place(e) => write!(f, "Place lookup failed: {}", e),
            CliError::Region(e) => write!(f, "Invalid region: {}", e),
            CliError::Output(e) => write!(f, "{}", e),
            CliError::Download(e) => write!(f, "Download failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Query(e) => Some(e),
            CliError::Metadata(e) => Some(e),
            CliError::Place(e) => Some(e),
            CliError::Region(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Download(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Runtime(e.to_string())
    }
}

impl From<OrchestratorError> for CliError {
    fn from(e: OrchestratorError) -> Self {
        CliError::Query(e)
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Metadata(e)
    }
}

impl From<PlaceError> for CliError {
    fn from(e: PlaceError) -> Self {
        CliError::Place(e)
    }
}

impl From<RegionError> for CliError {
    fn from(e: RegionError) -> Self {
        CliError::Region(e)
    }
}

impl From<OutputError> for CliError {
    fn from(e: OutputError) -> Self {
        CliError::Output(e)
    }
}

impl From<DownloadError> for CliError {
    fn from(e: DownloadError) -> Self {
        CliError::Download(e)
    }
}
