//! Column schema for flattening composite values

use std::collections::HashMap;

/// Fields the metadata API returns as lists.
pub const COMPOSITE_FIELDS: &[&str] = &["camera_parameters", "computed_rotation"];

/// How a column's values are written to flat outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Values are kept as they are
    Scalar,
    /// List and object values are replaced by their JSON text
    Composite,
}

/// Declared kind of each column.
///
/// Columns without a declaration are classified per batch by their first
/// non-empty value: a list makes the column composite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSchema {
    kinds: HashMap<String, FieldKind>,
}

impl RecordSchema {
    /// Creates a schema with no declarations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the known list-valued API fields among `fields` as
    /// composite. Other fields stay undeclared and are classified by their
    /// values.
    pub fn for_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let kinds = fields
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| COMPOSITE_FIELDS.contains(name))
            .map(|name| (name.to_string(), FieldKind::Composite))
            .collect();
        Self { kinds }
    }

    /// Adds or replaces a declaration.
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.kinds.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
