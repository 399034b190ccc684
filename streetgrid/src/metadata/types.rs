//! Metadata API types and defaults

use serde::Serialize;
use serde_json::{Map, Value};

/// Default endpoint of the image metadata API.
pub const DEFAULT_METADATA_URL: &str = "https://graph.mapillary.com/images";

/// Default per-request record limit (the API's result ceiling).
pub const DEFAULT_LIMIT: u32 = 5000;

/// Default set of requested fields.
pub const DEFAULT_FIELDS: &[&str] = &[
    "altitude",
    "atomic_scale",
    "camera_parameters",
    "camera_type",
    "captured_at",
    "compass_angle",
    "computed_altitude",
    "computed_compass_angle",
    "computed_geometry",
    "computed_rotation",
    "creator",
    "exif_orientation",
    "geometry",
    "height",
    "is_pano",
    "make",
    "model",
    "thumb_original_url",
    "merge_cc",
    "sequence",
    "width",
];

/// Field that carries a record's point geometry. Every query must request it.
pub const GEOMETRY_FIELD: &str = "geometry";

/// A single raw record as returned by the API.
pub type RawRecord = Map<String, Value>;

/// Owned copy of [`DEFAULT_FIELDS`].
pub fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

/// Parsed response of one bbox query.
///
/// Serializes to the API's own shape (`{"data": [...]}`), so a response can
/// be persisted and re-read as raw JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetadataResponse {
    /// Records in API order
    pub data: Vec<RawRecord>,

    /// The limit the query was issued with
    #[serde(skip)]
    pub limit: u32,
}

impl MetadataResponse {
    pub fn new(data: Vec<RawRecord>, limit: u32) -> Self {
        Self { data, limit }
    }

    /// Number of returned records.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the record count hit the requested limit.
    ///
    /// The API silently caps results, so a full page means more records may
    /// exist in the queried bbox than were returned.
    pub fn is_truncated(&self) -> bool {
        self.limit > 0 && self.data.len() == self.limit as usize
    }
}
