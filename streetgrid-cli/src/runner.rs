//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, token resolution
//! and the async runtime to reduce duplication across command handlers.

use std::future::Future;

use tokio::runtime::Runtime;
use tracing::info;

use streetgrid::config::ConfigFile;
use streetgrid::credentials::{discover_token, DiscoveredToken, TokenSource};
use streetgrid::http::AsyncReqwestClient;
use streetgrid::logging::{init_logging, LoggingGuard};
use streetgrid::metadata::MetadataClient;
use streetgrid::place::PlaceResolver;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Mirror debug-level logging to stderr
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&config.logging.file, verbose, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = Runtime::new().map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("StreetGrid v{}", streetgrid::VERSION);
        info!("StreetGrid CLI: {} command", command);
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Resolve the access token.
    ///
    /// Precedence: command line, then environment/token file, then the
    /// `access_token` setting of the config file.
    pub fn resolve_token(&self, cli_token: Option<String>) -> Result<DiscoveredToken, CliError> {
        let token = resolve_token_from(
            cli_token,
            || discover_token(&self.config.api.token_file),
            self.config.api.access_token.as_deref(),
        )?;
        info!(source = %token.source, "Using API access token");
        Ok(token)
    }

    /// Create an HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<AsyncReqwestClient, CliError> {
        Ok(AsyncReqwestClient::with_timeout(self.config.api.timeout)?)
    }

    /// Create a metadata client for the configured endpoint.
    pub fn metadata_client(&self) -> Result<MetadataClient<AsyncReqwestClient>, CliError> {
        Ok(MetadataClient::with_base_url(
            self.http_client()?,
            self.config.api.metadata_url.clone(),
        ))
    }

    /// Create a place resolver for the configured endpoint.
    pub fn place_resolver(&self) -> Result<PlaceResolver<AsyncReqwestClient>, CliError> {
        Ok(PlaceResolver::with_base_url(
            self.http_client()?,
            self.config.api.place_url.clone(),
        ))
    }
}

fn resolve_token_from<D>(
    cli_token: Option<String>,
    discover: D,
    config_token: Option<&str>,
) -> Result<DiscoveredToken, CliError>
where
    D: FnOnce() -> Option<DiscoveredToken>,
{
    if let Some(token) = cli_token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        return Ok(DiscoveredToken {
            token,
            source: TokenSource::CommandLine,
        });
    }

    if let Some(found) = discover() {
        return Ok(found);
    }

    config_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| DiscoveredToken {
            token: token.to_string(),
            source: TokenSource::ConfigFile,
        })
        .ok_or(CliError::MissingToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered(token: &str) -> Option<DiscoveredToken> {
        Some(DiscoveredToken {
            token: token.to_string(),
            source: TokenSource::Environment("API_TOKEN"),
        })
    }

    #[test]
    fn test_command_line_wins() {
        let token =
            resolve_token_from(Some(" cli ".to_string()), || discovered("env"), Some("cfg"))
                .unwrap();
        assert_eq!(token.token, "cli");
        assert_eq!(token.source, TokenSource::CommandLine);
    }

    #[test]
    fn test_environment_before_config() {
        let token = resolve_token_from(None, || discovered("env"), Some("cfg")).unwrap();
        assert_eq!(token.token, "env");
    }

    #[test]
    fn test_config_is_last_resort() {
        let token = resolve_token_from(Some("  ".to_string()), || None, Some("cfg")).unwrap();
        assert_eq!(token.token, "cfg");
        assert_eq!(token.source, TokenSource::ConfigFile);
    }

    #[test]
    fn test_missing_everywhere() {
        let result = resolve_token_from(None, || None, Some(" "));
        assert!(matches!(result, Err(CliError::MissingToken)));
    }
}
