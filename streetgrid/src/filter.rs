//! Point-in-polygon filtering of records
//!
//! Containment is strict: a point lying exactly on the polygon boundary is
//! outside.

use geo::{Contains, Point, Polygon};
use serde_json::Value;
use tracing::warn;

use crate::metadata::{MetadataResponse, GEOMETRY_FIELD};
use crate::record::ResultSet;

/// Returns the records whose point lies strictly inside `polygon`.
///
/// The input is left untouched and order is preserved. Filtering an already
/// filtered set with the same polygon returns it unchanged.
pub fn filter_by_polygon(records: &ResultSet, polygon: &Polygon<f64>) -> ResultSet {
    records
        .iter()
        .filter(|record| polygon.contains(&record.point()))
        .cloned()
        .collect()
}

/// Filters a raw API response, keeping records whose point lies strictly
/// inside `polygon`.
///
/// Records without a readable `geometry.coordinates` pair are dropped with a
/// warning.
pub fn filter_response_by_polygon(
    response: &MetadataResponse,
    polygon: &Polygon<f64>,
) -> MetadataResponse {
    let data = response
        .data
        .iter()
        .enumerate()
        .filter(|(index, raw)| match raw_point(raw.get(GEOMETRY_FIELD)) {
            Some(point) => polygon.contains(&point),
            None => {
                warn!(index, "Skipping record with malformed geometry");
                false
            }
        })
        .map(|(_, raw)| raw.clone())
        .collect();

    MetadataResponse::new(data, response.limit)
}

fn raw_point(geometry: Option<&Value>) -> Option<Point<f64>> {
    let coordinates = geometry?.get("coordinates")?.as_array()?;
    let lon = coordinates.first()?.as_f64()?;
    let lat = coordinates.get(1)?.as_f64()?;
    Some(Point::new(lon, lat))
}
