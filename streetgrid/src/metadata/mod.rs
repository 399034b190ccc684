//! Image metadata API client
//!
//! One validated, bounded bbox query per call, with truncation detection.

mod client;
mod error;
mod types;

pub use client::MetadataClient;
pub(crate) use client::validate_request;
pub use error::QueryError;
pub use types::{
    default_fields, MetadataResponse, RawRecord, DEFAULT_FIELDS, DEFAULT_LIMIT,
    DEFAULT_METADATA_URL, GEOMETRY_FIELD,
};

#[cfg(test)]
mod tests;
