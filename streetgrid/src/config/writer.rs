//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let access_token = config.api.access_token.as_deref().unwrap_or("");
    let dedupe = if config.query.dedupe { "true" } else { "false" };

    format!(
        r#"[api]
; Access token. Leave empty to read it from the API_TOKEN, MAPPILLARY_API_TOKEN
; or MAPILLARY_TOKEN environment variables, or from token_file.
access_token = {}
; File whose first line holds the access token
token_file = {}
; Image metadata endpoint
metadata_url = {}
; Place search endpoint (Nominatim compatible)
place_url = {}
; HTTP timeout in seconds
timeout = {}
; Maximum records per request. A tile that returns exactly this many records
; may be truncated; raise [query] zoom if that happens.
limit = {}

[query]
; Tile zoom level (0-24). Each zoom step splits a tile into four.
zoom = {}
; Number of tile queries in flight
concurrency = {}
; What to do when a tile query fails:
;   abort - stop the whole query (default)
;   skip  - record the failed tile in the report and continue
failure_policy = {}
; Drop records whose id was already returned by an earlier tile
dedupe = {}
; Comma-separated list of requested fields (must include geometry)
fields = {}
; Refuse regions covering more tiles than this at the chosen zoom
max_tiles = {}

[download]
; Pause after each image download, in milliseconds
cooldown_ms = {}

[logging]
; Log file path
file = {}
"#,
        access_token,
        path_to_string(&config.api.token_file),
        config.api.metadata_url,
        config.api.place_url,
        config.api.timeout,
        config.api.limit,
        config.query.zoom,
        config.query.concurrency,
        config.query.failure_policy,
        dedupe,
        config.query.fields.join(","),
        config.query.max_tiles,
        config.download.cooldown_ms,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
