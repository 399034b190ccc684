//! Image records and their projection to point geometries
//!
//! Raw API records become [`ImageRecord`]s with a (lon, lat) point, collected
//! in a [`ResultSet`]. List-valued columns are flattened to JSON text
//! according to a [`RecordSchema`] so results can be written to flat formats.

mod projector;
mod schema;
mod types;

pub use projector::{MalformedRecord, Projection, Projector};
pub use schema::{FieldKind, RecordSchema, COMPOSITE_FIELDS};
pub use types::{ImageRecord, ResultSet, CRS, GEOMETRY_COLUMN, ID_FIELD};
