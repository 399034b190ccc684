//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::MAX_CONCURRENCY;
use super::file::ConfigFileError;
use super::query::FailurePolicy;
use super::settings::ConfigFile;
use crate::coord::MAX_ZOOM;
use crate::metadata::GEOMETRY_FIELD;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [api] section
    if let Some(section) = ini.section(Some("api")) {
        if let Some(v) = section.get("access_token") {
            let v = v.trim();
            if !v.is_empty() {
                config.api.access_token = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("token_file") {
            let v = v.trim();
            if !v.is_empty() {
                config.api.token_file = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("metadata_url") {
            config.api.metadata_url = parse_url("api", "metadata_url", v)?;
        }
        if let Some(v) = section.get("place_url") {
            config.api.place_url = parse_url("api", "place_url", v)?;
        }
        if let Some(v) = section.get("timeout") {
            config.api.timeout = parse_number("api", "timeout", v, 1, 3600)?;
        }
        if let Some(v) = section.get("limit") {
            config.api.limit = parse_number("api", "limit", v, 1, u32::MAX)?;
        }
    }

    // [query] section
    if let Some(section) = ini.section(Some("query")) {
        if let Some(v) = section.get("zoom") {
            config.query.zoom = parse_number("query", "zoom", v, 0, MAX_ZOOM)?;
        }
        if let Some(v) = section.get("concurrency") {
            config.query.concurrency =
                parse_number("query", "concurrency", v, 1, MAX_CONCURRENCY)?;
        }
        if let Some(v) = section.get("failure_policy") {
            config.query.failure_policy =
                FailurePolicy::from_str(v).map_err(|reason| ConfigFileError::InvalidValue {
                    section: "query".to_string(),
                    key: "failure_policy".to_string(),
                    value: v.to_string(),
                    reason,
                })?;
        }
        if let Some(v) = section.get("dedupe") {
            config.query.dedupe = parse_bool("query", "dedupe", v)?;
        }
        if let Some(v) = section.get("fields") {
            config.query.fields = parse_fields(v)?;
        }
        if let Some(v) = section.get("max_tiles") {
            config.query.max_tiles = parse_number("query", "max_tiles", v, 1, u64::MAX)?;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("cooldown_ms") {
            config.download.cooldown_ms = parse_number("download", "cooldown_ms", v, 0, 60_000)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_number<T>(section: &str, key: &str, value: &str, min: T, max: T) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a whole number"))?;
    if parsed < min || parsed > max {
        return Err(invalid(
            section,
            key,
            value,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(parsed)
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn parse_url(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let value = value.trim();
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(invalid(section, key, value, "must be an http(s) URL"));
    }
    Ok(value.to_string())
}

fn parse_fields(value: &str) -> Result<Vec<String>, ConfigFileError> {
    let fields: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if !fields.iter().any(|f| f == GEOMETRY_FIELD) {
        return Err(invalid(
            "query",
            "fields",
            value,
            format!("must include '{}'", GEOMETRY_FIELD),
        ));
    }
    Ok(fields)
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = parse(
            r#"
[api]
access_token = MLY|123
token_file = /etc/streetgrid/token
metadata_url = http://localhost:8080/images
place_url = http://localhost:8081/search
timeout = 10
limit = 2000

[query]
zoom = 17
concurrency = 8
failure_policy = skip
dedupe = false
fields = id, geometry, captured_at
max_tiles = 250000

[download]
cooldown_ms = 0

[logging]
file = /var/log/streetgrid.log
"#,
        )
        .unwrap();

        assert_eq!(config.api.access_token.as_deref(), Some("MLY|123"));
        assert_eq!(config.api.token_file, PathBuf::from("/etc/streetgrid/token"));
        assert_eq!(config.api.metadata_url, "http://localhost:8080/images");
        assert_eq!(config.api.place_url, "http://localhost:8081/search");
        assert_eq!(config.api.timeout, 10);
        assert_eq!(config.api.limit, 2000);
        assert_eq!(config.query.zoom, 17);
        assert_eq!(config.query.concurrency, 8);
        assert_eq!(config.query.failure_policy, FailurePolicy::SkipAndReport);
        assert!(!config.query.dedupe);
        assert_eq!(config.query.fields, vec!["id", "geometry", "captured_at"]);
        assert_eq!(config.query.max_tiles, 250_000);
        assert_eq!(config.download.cooldown_ms, 0);
        assert_eq!(config.logging.file, PathBuf::from("/var/log/streetgrid.log"));
    }

    #[test]
    fn test_blank_token_keeps_default() {
        let config = parse("[api]\naccess_token =\n").unwrap();
        assert!(config.api.access_token.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("[query]\nzoom = 25\n", "zoom"),
            ("[query]\nzoom = high\n", "zoom"),
            ("[query]\nconcurrency = 0\n", "concurrency"),
            ("[query]\nfailure_policy = retry\n", "failure_policy"),
            ("[query]\ndedupe = maybe\n", "dedupe"),
            ("[query]\nfields = id,captured_at\n", "fields"),
            ("[query]\nmax_tiles = 0\n", "max_tiles"),
            ("[api]\nlimit = 0\n", "limit"),
            ("[api]\nmetadata_url = ftp://example.com\n", "metadata_url"),
            ("[download]\ncooldown_ms = -5\n", "cooldown_ms"),
        ];

        for (content, expected_key) in cases {
            match parse(content) {
                Err(ConfigFileError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
                other => panic!("expected InvalidValue for {:?}, got {:?}", content, other),
            }
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/token"), home.join("token"));
        }
    }
}
