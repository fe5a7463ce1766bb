//! Schemaless entity documents.
//!
//! Data Dragon and Meraki payloads carry far more fields than any caller
//! reads, and upstream adds fields between patches. Records therefore keep
//! the raw JSON object and expose soft, pointer-based accessors instead of a
//! fixed struct.

use serde_json::Value;

use super::IdList;

/// Soft field access shared by bulk and detail records.
///
/// Pointers use RFC 6901 syntax (`/shop/prices/total`). A missing or
/// mistyped field is `None` (or empty), never an error.
pub trait Document {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn body(&self) -> &Value;

    fn value_at(&self, pointer: &str) -> Option<&Value> {
        self.body().pointer(pointer)
    }

    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.value_at(pointer).and_then(Value::as_str)
    }

    fn i64_at(&self, pointer: &str) -> Option<i64> {
        self.value_at(pointer).and_then(Value::as_i64)
    }

    fn bool_at(&self, pointer: &str) -> Option<bool> {
        self.value_at(pointer).and_then(Value::as_bool)
    }

    /// String entries of an array field; non-string entries are skipped
    fn strings_at(&self, pointer: &str) -> Vec<String> {
        match self.value_at(pointer) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn ids_at(&self, pointer: &str) -> IdList {
        IdList::from_value(self.value_at(pointer))
    }

    /// Whether the array at `pointer` contains `needle` exactly
    fn array_contains(&self, pointer: &str, needle: &str) -> bool {
        match self.value_at(pointer) {
            Some(Value::Array(entries)) => entries.iter().any(|v| v.as_str() == Some(needle)),
            _ => false,
        }
    }
}

/// One entity's summary fields from the bulk index.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    id: String,
    name: String,
    body: Value,
}

impl EntityRecord {
    /// Build a record from one entry of the bulk object.
    ///
    /// The id is the object key. The name falls back to the key when the
    /// entry has no string `name`. Returns `None` when the entry is not an
    /// object.
    pub fn from_entry(key: &str, value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string();

        Some(Self {
            id: key.to_string(),
            name,
            body: Value::Object(fields),
        })
    }
}

impl Document for EntityRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &Value {
        &self.body
    }
}

/// The richer per-entity document, fetched lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    id: String,
    name: String,
    body: Value,
}

impl DetailRecord {
    /// Same construction rules as `EntityRecord::from_entry`
    pub fn from_entry(key: &str, value: Value) -> Option<Self> {
        EntityRecord::from_entry(key, value).map(Self::from)
    }
}

impl From<EntityRecord> for DetailRecord {
    fn from(record: EntityRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            body: record.body,
        }
    }
}

impl Document for DetailRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &Value {
        &self.body
    }
}
