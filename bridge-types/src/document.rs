//! Backend documents.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::FieldValue;

/// A document read from a backend collection.
///
/// `fields` holds the document data already decoded into plain JSON,
/// the same shape a client SDK hands back from `data()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend-assigned document identifier (last path segment)
    pub id: String,
    /// Decoded document fields
    #[serde(default)]
    pub fields: Map<String, FieldValue>,
}

impl Document {
    /// Create an empty document with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder helper to set one field.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
