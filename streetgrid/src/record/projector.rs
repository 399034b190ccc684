//! Raw record to point-geometry projection

use geo::Point;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use super::schema::{FieldKind, RecordSchema};
use super::types::{value_as_id, ImageRecord, ResultSet, GEOMETRY_COLUMN, ID_FIELD};
use crate::metadata::{MetadataResponse, RawRecord};

/// A raw record that could not be projected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// Position of the record in its response
    pub index: usize,
    /// Record id, when it had one
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of projecting one response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub records: ResultSet,
    pub malformed: Vec<MalformedRecord>,
}

/// Converts raw API records into point-geometry records.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    schema: RecordSchema,
}

impl Projector {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Projects every record of a response.
    ///
    /// Records whose geometry cannot be read are logged, reported in
    /// [`Projection::malformed`] and left out; the rest of the batch is still
    /// projected.
    pub fn project(&self, response: &MetadataResponse) -> Projection {
        let mut projection = Projection::default();

        for (index, raw) in response.data.iter().enumerate() {
            match extract_point(raw) {
                Ok(point) => {
                    let properties = raw
                        .iter()
                        .filter(|(key, _)| key.as_str() != GEOMETRY_COLUMN)
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect();
                    projection.records.push(ImageRecord::new(properties, point));
                }
                Err(reason) => {
                    let id = raw.get(ID_FIELD).and_then(value_as_id);
                    warn!(index, id = ?id, reason = %reason, "Skipping malformed record");
                    projection.malformed.push(MalformedRecord { index, id, reason });
                }
            }
        }

        self.coerce_composites(&mut projection.records);
        projection
    }

    /// Replaces composite values by their JSON text.
    fn coerce_composites(&self, records: &mut ResultSet) {
        let mut kinds: HashMap<String, FieldKind> = HashMap::new();
        for column in records.columns() {
            let kind = self
                .schema
                .kind(&column)
                .unwrap_or_else(|| infer_kind(records, &column));
            kinds.insert(column, kind);
        }

        for record in records.records_mut() {
            for (column, value) in record.properties_mut().iter_mut() {
                if kinds.get(column) == Some(&FieldKind::Composite) {
                    if let Value::Array(_) | Value::Object(_) = value {
                        *value = Value::String(value.to_string());
                    }
                }
            }
        }
    }
}

/// Classifies an undeclared column by its first non-empty value.
fn infer_kind(records: &ResultSet, column: &str) -> FieldKind {
    let first = records
        .iter()
        .filter_map(|r| r.get(column))
        .find(|v| !is_empty_value(v));

    match first {
        Some(Value::Array(_)) => FieldKind::Composite,
        _ => FieldKind::Scalar,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn extract_point(raw: &RawRecord) -> Result<Point<f64>, String> {
    let geometry = raw
        .get(GEOMETRY_COLUMN)
        .ok_or_else(|| "missing geometry".to_string())?
        .as_object()
        .ok_or_else(|| "geometry is not an object".to_string())?;

    let coordinates = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| "geometry has no coordinates array".to_string())?;

    if coordinates.len() < 2 {
        return Err(format!(
            "expected at least 2 coordinates, got {}",
            coordinates.len()
        ));
    }

    let lon = coordinates[0]
        .as_f64()
        .ok_or_else(|| format!("longitude is not a number: {}", coordinates[0]))?;
    let lat = coordinates[1]
        .as_f64()
        .ok_or_else(|| format!("latitude is not a number: {}", coordinates[1]))?;

    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude out of range: {}", lon));
    }
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude out of range: {}", lat));
    }

    Ok(Point::new(lon, lat))
}
