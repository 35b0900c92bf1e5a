//! Business object model
//!
//! Object types, records and their per-object field schema. The objects
//! themselves are owned by the external platform; this module only describes
//! their shape.

mod record;
mod schema;
mod types;

pub use record::{Record, RecordId};
pub use schema::{FieldDef, FieldKind, ObjectSchema, SchemaViolation};
pub use types::{fields, ObjectType};
