//! Record and identifier types
//!
//! A record is an object type, an optional store-assigned id and a map of
//! field values keyed by API name. Records without an id have never been
//! saved.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::types::ObjectType;

/// Opaque identifier assigned by the store on creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for the `sequence`-th record of an object type
    ///
    /// Format: key prefix followed by a 12-digit zero-padded sequence.
    pub fn from_sequence(object_type: ObjectType, sequence: u64) -> Self {
        Self(format!("{}{:012}", object_type.key_prefix(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object type encoded in the id prefix, if recognizable
    pub fn object_type(&self) -> Option<ObjectType> {
        self.0.get(..3).and_then(ObjectType::from_key_prefix)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&RecordId> for Value {
    fn from(id: &RecordId) -> Self {
        Value::String(id.0.clone())
    }
}

/// A single business-object record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub object_type: ObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an unsaved record with no fields
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field assignment
    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Builder-style id assignment
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of a field; `None` for missing or non-string values
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    /// Value of the object's name field
    pub fn name(&self) -> Option<&str> {
        self.object_type
            .name_field()
            .and_then(|field| self.get_str(field))
    }

    /// Field names in deterministic order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}
