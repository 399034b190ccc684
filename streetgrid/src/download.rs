//! Image download
//!
//! Downloads the image referenced by each record to `<out_dir>/<id>.jpg`,
//! one at a time with a pause after each download. Individual failures are
//! collected into a [`DownloadSummary`] instead of stopping the batch.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_COOLDOWN_MS;
use crate::http::AsyncHttpClient;
use crate::record::{ResultSet, ID_FIELD};

/// Default column holding the image URL.
pub const DEFAULT_URL_FIELD: &str = "thumb_original_url";

/// Number of individual errors repeated in the completion log.
const LOGGED_ERRORS: usize = 5;

/// Image download errors.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a batch download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub success: usize,
    pub failed: usize,
    /// One message per failed record
    pub errors: Vec<String>,
}

/// Sequential image downloader.
pub struct ImageDownloader<C: AsyncHttpClient> {
    http: C,
    cooldown: Duration,
}

impl<C: AsyncHttpClient> ImageDownloader<C> {
    /// Creates a downloader with the default cooldown.
    pub fn new(http: C) -> Self {
        Self {
            http,
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
        }
    }

    /// Sets the pause after each download. Zero disables it.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Downloads one image to `path`, then waits for the cooldown.
    pub async fn download_image(&self, url: &str, path: &Path) -> Result<(), DownloadError> {
        let response = self
            .http
            .get(url)
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(DownloadError::Status(response.status));
        }

        tokio::fs::write(path, &response.body)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), bytes = response.body.len(), "Image downloaded");

        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
        Ok(())
    }

    /// Downloads the image of every record.
    ///
    /// # Errors
    ///
    /// [`DownloadError::InvalidArgument`] when `id_field` or `url_field` is
    /// not a column of a non-empty input, and [`DownloadError::Io`] when the
    /// output directory cannot be created. Per-record failures, including
    /// empty URLs and ids that are not plain file names, are counted in the
    /// summary.
    pub async fn download_all(
        &self,
        records: &ResultSet,
        out_dir: &Path,
        id_field: &str,
        url_field: &str,
    ) -> Result<DownloadSummary, DownloadError> {
        if records.is_empty() {
            warn!("No records provided, nothing to download");
            return Ok(DownloadSummary::default());
        }

        for field in [id_field, url_field] {
            if !records.has_column(field) {
                return Err(DownloadError::InvalidArgument(format!(
                    "field '{}' not found in record columns",
                    field
                )));
            }
        }

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: out_dir.to_path_buf(),
                source,
            })?;

        info!(count = records.len(), out_dir = %out_dir.display(), "Downloading images");

        let mut summary = DownloadSummary::default();
        for record in records {
            let id = record
                .get(id_field)
                .and_then(field_text)
                .unwrap_or_else(|| "unknown".to_string());

            let url = match record.get(url_field).and_then(field_text) {
                Some(url) => url,
                None => {
                    summary.failed += 1;
                    summary.errors.push(format!("Empty URL for image ID: {}", id));
                    continue;
                }
            };

            let Some(file_name) = image_file_name(&id) else {
                summary.failed += 1;
                summary
                    .errors
                    .push(format!("Invalid image ID {:?}: not usable as a file name", id));
                continue;
            };

            let path = out_dir.join(file_name);
            match self.download_image(&url, &path).await {
                Ok(()) => summary.success += 1,
                Err(e) => {
                    summary.failed += 1;
                    summary
                        .errors
                        .push(format!("Failed to download image ID {}: {}", id, e));
                }
            }
        }

        info!(
            success = summary.success,
            failed = summary.failed,
            "Download completed"
        );
        for error in summary.errors.iter().take(LOGGED_ERRORS) {
            warn!("{}", error);
        }
        if summary.errors.len() > LOGGED_ERRORS {
            warn!(
                "... and {} more errors",
                summary.errors.len() - LOGGED_ERRORS
            );
        }

        Ok(summary)
    }

    /// [`download_all`](Self::download_all) with the default `id` and
    /// [`DEFAULT_URL_FIELD`] columns.
    pub async fn download_records(
        &self,
        records: &ResultSet,
        out_dir: &Path,
    ) -> Result<DownloadSummary, DownloadError> {
        self.download_all(records, out_dir, ID_FIELD, DEFAULT_URL_FIELD)
            .await
    }
}

/// `<id>.jpg`, or `None` when the id could name a path outside the output
/// directory.
fn image_file_name(id: &str) -> Option<String> {
    let unsafe_char = |c: char| matches!(c, '/' | '\\' | ':') || c.is_control();
    if id == "." || id == ".." || id.contains(unsafe_char) {
        return None;
    }
    Some(format!("{}.jpg", id))
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
