//! Per-object field schema
//!
//! Validation semantics:
//! - All required fields are present and non-null
//! - No undeclared fields exist
//! - Field values match their declared kind
//! - Reference fields carry an id of the referenced object type
//!
//! Referenced records existing is the store's concern, not the schema's.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use super::record::{Record, RecordId};
use super::types::{fields, ObjectType};

/// Declared kind of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 string
    Text,
    /// ISO-8601 calendar date string (`YYYY-MM-DD`)
    Date,
    /// JSON number
    Currency,
    /// Id of a record of the given object type
    Reference(ObjectType),
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::Currency => "currency",
            FieldKind::Reference(_) => "reference",
        }
    }
}

/// Field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDef {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

const ACCOUNT_FIELDS: &[FieldDef] = &[
    FieldDef::required(fields::NAME, FieldKind::Text),
    FieldDef::optional(fields::INDUSTRY, FieldKind::Text),
    FieldDef::optional(fields::DESCRIPTION, FieldKind::Text),
];

const CONTACT_FIELDS: &[FieldDef] = &[
    FieldDef::optional(fields::FIRST_NAME, FieldKind::Text),
    FieldDef::required(fields::LAST_NAME, FieldKind::Text),
    FieldDef::optional(fields::ACCOUNT_ID, FieldKind::Reference(ObjectType::Account)),
];

const OPPORTUNITY_FIELDS: &[FieldDef] = &[
    FieldDef::required(fields::NAME, FieldKind::Text),
    FieldDef::required(fields::STAGE_NAME, FieldKind::Text),
    FieldDef::required(fields::CLOSE_DATE, FieldKind::Date),
    FieldDef::optional(fields::AMOUNT, FieldKind::Currency),
    FieldDef::optional(fields::ACCOUNT_ID, FieldKind::Reference(ObjectType::Account)),
];

const LEAD_FIELDS: &[FieldDef] = &[
    FieldDef::required(fields::LAST_NAME, FieldKind::Text),
    FieldDef::required(fields::COMPANY, FieldKind::Text),
];

const CASE_FIELDS: &[FieldDef] = &[
    FieldDef::required(fields::ORIGIN, FieldKind::Text),
    FieldDef::required(fields::STATUS, FieldKind::Text),
    FieldDef::optional(fields::ACCOUNT_ID, FieldKind::Reference(ObjectType::Account)),
];

/// A record that violates its object's schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("{object}: required field {field} is missing")]
    RequiredFieldMissing { object: ObjectType, field: String },

    #[error("{object}: no such field {field}")]
    UnknownField { object: ObjectType, field: String },

    #[error("{object}.{field}: expected {expected}, found {found}")]
    InvalidFieldValue {
        object: ObjectType,
        field: String,
        expected: &'static str,
        found: String,
    },
}

/// Field schema of one object type
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    object_type: ObjectType,
    fields: &'static [FieldDef],
}

impl ObjectSchema {
    /// Schema for an object type
    pub fn of(object_type: ObjectType) -> Self {
        let fields = match object_type {
            ObjectType::Account => ACCOUNT_FIELDS,
            ObjectType::Contact => CONTACT_FIELDS,
            ObjectType::Opportunity => OPPORTUNITY_FIELDS,
            ObjectType::Lead => LEAD_FIELDS,
            ObjectType::Case => CASE_FIELDS,
        };
        Self {
            object_type,
            fields,
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Reference fields and the ids they carry on `record`
    pub fn references<'r>(
        &self,
        record: &'r Record,
    ) -> impl Iterator<Item = (&'static FieldDef, &'r str)> + 'r {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Reference(_)))
            .filter_map(move |f| record.get_str(f.name).map(|id| (f, id)))
    }

    /// Validates a complete record (for updates, the merged record).
    ///
    /// Validation is deterministic: fields are checked in record order,
    /// then required fields in schema order.
    pub fn validate(&self, record: &Record) -> Result<(), SchemaViolation> {
        for (name, value) in &record.fields {
            let def = self
                .field(name)
                .ok_or_else(|| SchemaViolation::UnknownField {
                    object: self.object_type,
                    field: name.clone(),
                })?;

            if value.is_null() {
                continue;
            }
            self.validate_value(def, value)?;
        }

        for def in self.fields.iter().filter(|f| f.required) {
            let present = record.get(def.name).is_some_and(|v| !v.is_null());
            if !present {
                return Err(SchemaViolation::RequiredFieldMissing {
                    object: self.object_type,
                    field: def.name.to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_value(&self, def: &FieldDef, value: &Value) -> Result<(), SchemaViolation> {
        let ok = match def.kind {
            FieldKind::Text => value.is_string(),
            FieldKind::Currency => value.is_number(),
            FieldKind::Date => value
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
            FieldKind::Reference(target) => value
                .as_str()
                .is_some_and(|s| RecordId::new(s).object_type() == Some(target)),
        };

        if ok {
            Ok(())
        } else {
            Err(SchemaViolation::InvalidFieldValue {
                object: self.object_type,
                field: def.name.to_string(),
                expected: def.kind.kind_name(),
                found: json_type_name(value).to_string(),
            })
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
