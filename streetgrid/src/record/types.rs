//! Projected record and result set types

use geo::Point;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Coordinate reference system of every result set.
pub const CRS: &str = "EPSG:4326";

/// Name of the single geometry column.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Property holding a record's unique identifier.
pub const ID_FIELD: &str = "id";

/// An image record with its location projected to a point.
///
/// The point is in (lon, lat) order. `properties` holds every other field of
/// the raw record, in API order, with the geometry removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    properties: Map<String, Value>,
    point: Point<f64>,
}

impl ImageRecord {
    pub fn new(properties: Map<String, Value>, point: Point<f64>) -> Self {
        Self { properties, point }
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn point(&self) -> Point<f64> {
        self.point
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    /// Returns a property value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.properties.get(field)
    }

    /// Returns the record id as text, for string or numeric ids.
    pub fn id(&self) -> Option<String> {
        value_as_id(self.properties.get(ID_FIELD)?)
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.properties
    }
}

pub(crate) fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered collection of image records.
///
/// All records share the CRS [`CRS`] and the geometry column
/// [`GEOMETRY_COLUMN`]. Order is insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    records: Vec<ImageRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        Self { records }
    }

    pub fn crs(&self) -> &'static str {
        CRS
    }

    pub fn geometry_column(&self) -> &'static str {
        GEOMETRY_COLUMN
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ImageRecord> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }

    pub(crate) fn records_mut(&mut self) -> &mut [ImageRecord] {
        &mut self.records
    }

    pub fn push(&mut self, record: ImageRecord) {
        self.records.push(record);
    }

    /// Appends every record of `other`, preserving its order.
    pub fn extend(&mut self, other: ResultSet) {
        self.records.extend(other.records);
    }

    /// Union of property names across all records, in first-seen order,
    /// followed by the geometry column.
    pub fn columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for record in &self.records {
            for key in record.properties.keys() {
                if seen.insert(key.as_str()) {
                    columns.push(key.clone());
                }
            }
        }
        columns.push(GEOMETRY_COLUMN.to_string());
        columns
    }

    /// True when `column` is a property of at least one record or the
    /// geometry column.
    pub fn has_column(&self, column: &str) -> bool {
        column == GEOMETRY_COLUMN || self.records.iter().any(|r| r.properties.contains_key(column))
    }

    /// Drops records whose id repeats an earlier record's id.
    ///
    /// The first occurrence wins. Records without an id are kept. Returns the
    /// number of records removed.
    pub fn dedup_by_id(&mut self) -> usize {
        let before = self.records.len();
        let mut seen = HashSet::new();
        self.records.retain(|record| match record.id() {
            Some(id) => seen.insert(id),
            None => true,
        });
        before - self.records.len()
    }
}

impl IntoIterator for ResultSet {
    type Item = ImageRecord;
    type IntoIter = std::vec::IntoIter<ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ImageRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ImageRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
