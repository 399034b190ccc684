//! Bounded bbox queries against the image metadata API.

use serde_json::Value;
use tracing::{debug, warn};

use super::error::QueryError;
use super::types::{MetadataResponse, RawRecord, DEFAULT_METADATA_URL, GEOMETRY_FIELD};
use crate::geometry::BoundingBox;
use crate::http::{build_url, AsyncHttpClient, HttpResponse};

/// Client for the image metadata API.
///
/// Each call issues exactly one GET request. The API caps the number of
/// returned records at `limit`; a full page is reported through
/// [`MetadataResponse::is_truncated`] and a warning, never by fetching more.
pub struct MetadataClient<C: AsyncHttpClient> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> MetadataClient<C> {
    /// Creates a client for the default API endpoint.
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_METADATA_URL)
    }

    /// Creates a client for a custom endpoint.
    pub fn with_base_url(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queries all records inside a bbox given as separate coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_lon`, `min_lat`, `max_lon`, `max_lat` - Bbox in degrees
    /// * `fields` - Requested fields; must include `geometry`
    /// * `token` - API access token
    /// * `limit` - Maximum number of records to return
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidArgument`] for an invalid bbox, limit, token or
    /// field list, raised before any request is made. Otherwise the errors of
    /// [`query_bbox`](Self::query_bbox).
    #[allow(clippy::too_many_arguments)]
    pub async fn query_metadata(
        &self,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
        fields: &[String],
        token: &str,
        limit: u32,
    ) -> Result<MetadataResponse, QueryError> {
        let bbox = BoundingBox::new(min_lon, min_lat, max_lon, max_lat)?;
        self.query_bbox(&bbox, fields, token, limit).await
    }

    /// Queries all records inside an already validated bbox.
    pub async fn query_bbox(
        &self,
        bbox: &BoundingBox,
        fields: &[String],
        token: &str,
        limit: u32,
    ) -> Result<MetadataResponse, QueryError> {
        validate_request(fields, token, limit)?;

        let bbox_param = bbox.to_query_param();
        let url = build_url(
            &self.base_url,
            &[
                ("bbox", bbox_param.clone()),
                ("limit", limit.to_string()),
                ("access_token", token.to_string()),
                ("fields", fields.join(",")),
            ],
        )?;

        debug!(bbox = %bbox_param, limit, "Querying image metadata");

        let response = self.http.get(&url).await?;
        let metadata = parse_response(&response, limit)?;

        if metadata.is_truncated() {
            warn!(
                bbox = %bbox_param,
                limit,
                "Query returned exactly `limit` records, more may exist; use a finer zoom level"
            );
        }

        debug!(bbox = %bbox_param, count = metadata.count(), "Metadata query complete");
        Ok(metadata)
    }
}

pub(crate) fn validate_request(fields: &[String], token: &str, limit: u32) -> Result<(), QueryError> {
    if limit == 0 {
        return Err(QueryError::InvalidArgument(
            "limit must be a positive integer".to_string(),
        ));
    }
    if token.trim().is_empty() {
        return Err(QueryError::InvalidArgument(
            "no API access token provided".to_string(),
        ));
    }
    if fields.is_empty() {
        return Err(QueryError::InvalidArgument(
            "field list must not be empty".to_string(),
        ));
    }
    if !fields.iter().any(|f| f == GEOMETRY_FIELD) {
        return Err(QueryError::InvalidArgument(format!(
            "field list must include '{}'",
            GEOMETRY_FIELD
        )));
    }
    Ok(())
}

/// Interprets a response body.
///
/// An `error` payload wins over the HTTP status, so a 4xx carrying the API's
/// message surfaces that message.
fn parse_response(response: &HttpResponse, limit: u32) -> Result<MetadataResponse, QueryError> {
    let value: Value = match serde_json::from_slice(&response.body) {
        Ok(value) => value,
        Err(_) if !response.is_success() => {
            return Err(QueryError::Network(format!(
                "HTTP status {}",
                response.status
            )));
        }
        Err(e) => {
            return Err(QueryError::MalformedResponse(format!(
                "body is not valid JSON: {}",
                e
            )));
        }
    };

    if let Some(error) = value.get("error") {
        return Err(api_error(error));
    }

    if !response.is_success() {
        return Err(QueryError::Network(format!(
            "HTTP status {}",
            response.status
        )));
    }

    let items = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| QueryError::MalformedResponse("missing 'data' array".to_string()))?;

    let data = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().cloned().ok_or_else(|| {
                QueryError::MalformedResponse(format!("record {} is not an object", index))
            })
        })
        .collect::<Result<Vec<RawRecord>, _>>()?;

    Ok(MetadataResponse::new(data, limit))
}

fn api_error(error: &Value) -> QueryError {
    let message = match error {
        Value::String(s) => s.clone(),
        _ => error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown API error")
            .to_string(),
    };
    let code = error.get("code").and_then(Value::as_i64);
    QueryError::Api { message, code }
}
