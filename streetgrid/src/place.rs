//! Named-place resolution
//!
//! Resolves a place name to its boundary polygon through a Nominatim
//! compatible search service.

use geo::Polygon;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::http::{build_url, AsyncHttpClient, HttpError, DEFAULT_USER_AGENT};
use crate::region::polygon_from_geojson;

/// Default place search endpoint.
pub const DEFAULT_PLACE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Place resolution errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No results found for place name: '{0}'")]
    NotFound(String),

    #[error("No polygon geometry found for place name: '{0}'")]
    NoPolygon(String),
}

impl From<HttpError> for PlaceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Transport(msg) => PlaceError::Network(msg),
            HttpError::InvalidUrl { .. } => PlaceError::InvalidArgument(e.to_string()),
        }
    }
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Display name reported by the service
    pub display_name: Option<String>,
    /// Raw GeoJSON Polygon geometry, as returned
    pub geojson: Value,
    /// The boundary in (lon, lat) order
    pub polygon: Polygon<f64>,
}

/// Resolves place names to boundary polygons.
pub struct PlaceResolver<C: AsyncHttpClient> {
    http: C,
    base_url: String,
    user_agent: String,
}

impl<C: AsyncHttpClient> PlaceResolver<C> {
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_PLACE_URL)
    }

    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Overrides the User-Agent sent with each search.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolves a place name to its most important polygon result.
    ///
    /// Results are ranked by `importance` (missing counts as 0), highest
    /// first; the first one whose geometry is a Polygon wins.
    pub async fn resolve(&self, name: &str) -> Result<Place, PlaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaceError::InvalidArgument(
                "place name must not be empty".to_string(),
            ));
        }

        let url = build_url(
            &self.base_url,
            &[
                ("q", name.to_string()),
                ("format", "json".to_string()),
                ("polygon_geojson", "1".to_string()),
            ],
        )?;

        debug!(place = name, "Resolving place");
        let response = self
            .http
            .get_with_headers(&url, &[("User-Agent", self.user_agent.as_str())])
            .await?;

        if !response.is_success() {
            return Err(PlaceError::Network(format!(
                "HTTP status {}",
                response.status
            )));
        }

        let value: Value = serde_json::from_slice(&response.body)
            .map_err(|e| PlaceError::MalformedResponse(format!("body is not valid JSON: {}", e)))?;
        let mut results = value
            .as_array()
            .cloned()
            .ok_or_else(|| PlaceError::MalformedResponse("expected a JSON array".to_string()))?;

        if results.is_empty() {
            return Err(PlaceError::NotFound(name.to_string()));
        }

        results.sort_by(|a, b| importance(b).total_cmp(&importance(a)));

        let best = results
            .into_iter()
            .find(is_polygon_result)
            .ok_or_else(|| PlaceError::NoPolygon(name.to_string()))?;

        let geojson = best.get("geojson").cloned().unwrap_or(Value::Null);
        let polygon = polygon_from_geojson(&geojson)
            .map_err(|e| PlaceError::MalformedResponse(e.to_string()))?;

        let display_name = best
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        info!(place = name, display_name = ?display_name, "Place resolved");

        Ok(Place {
            display_name,
            geojson,
            polygon,
        })
    }
}

fn is_polygon_result(result: &Value) -> bool {
    result
        .get("geojson")
        .and_then(|g| g.get("type"))
        .and_then(Value::as_str)
        == Some("Polygon")
}

fn importance(result: &Value) -> f64 {
    result
        .get("importance")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
