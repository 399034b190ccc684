//! Access token discovery
//!
//! Looks for the API token in environment variables first, then in the first
//! line of a token file. Discovery never fails: callers decide what a missing
//! token means.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variables checked for a token, in priority order.
pub const TOKEN_ENV_VARS: &[&str] = &["API_TOKEN", "MAPPILLARY_API_TOKEN", "MAPILLARY_TOKEN"];

/// Where a token was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Passed explicitly on the command line
    CommandLine,
    /// Read from the named environment variable
    Environment(&'static str),
    /// Read from a token file
    File(PathBuf),
    /// Read from the configuration file
    ConfigFile,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::CommandLine => write!(f, "command line"),
            TokenSource::Environment(var) => write!(f, "environment variable {}", var),
            TokenSource::File(path) => write!(f, "token file {}", path.display()),
            TokenSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// A token and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscoveredToken {
    pub token: String,
    pub source: TokenSource,
}

// Keeps the token itself out of debug output and logs.
impl fmt::Debug for DiscoveredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredToken")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Discovers a token from the process environment or `token_file`.
pub fn discover_token(token_file: &Path) -> Option<DiscoveredToken> {
    discover_token_with(|name| std::env::var(name).ok(), token_file)
}

/// Discovers a token using a custom environment lookup.
///
/// Environment values are trimmed and blank values ignored. The token file
/// contributes its trimmed first line, if non-empty. An unreadable file is
/// logged and treated as absent.
pub fn discover_token_with<F>(env: F, token_file: &Path) -> Option<DiscoveredToken>
where
    F: Fn(&str) -> Option<String>,
{
    for &var in TOKEN_ENV_VARS {
        if let Some(value) = env(var) {
            let value = value.trim();
            if !value.is_empty() {
                debug!(source = var, "Found API token in environment");
                return Some(DiscoveredToken {
                    token: value.to_string(),
                    source: TokenSource::Environment(var),
                });
            }
        }
    }

    if !token_file.exists() {
        debug!(path = %token_file.display(), "No token file");
        return None;
    }

    match fs::read_to_string(token_file) {
        Ok(content) => {
            let token = content.lines().next().unwrap_or("").trim();
            if token.is_empty() {
                debug!(path = %token_file.display(), "Token file is empty");
                return None;
            }
            debug!(path = %token_file.display(), "Found API token in file");
            Some(DiscoveredToken {
                token: token.to_string(),
                source: TokenSource::File(token_file.to_path_buf()),
            })
        }
        Err(e) => {
            warn!(path = %token_file.display(), error = %e, "Could not read token file");
            None
        }
    }
}
