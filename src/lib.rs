//! crmdml - Record manipulation procedures over CRM business objects
//!
//! Create, read, update, upsert and delete examples against Account,
//! Contact, Opportunity, Lead and Case records held by an external store.

pub mod access;
pub mod config;
pub mod dml;
pub mod observability;
pub mod sobject;
pub mod store;

pub use access::{AccessPolicy, ObjectPermissions};
pub use config::DmlConfig;
pub use dml::{DmlError, DmlResult, DmlService};
pub use sobject::{ObjectType, Record, RecordId};
pub use store::{InMemoryStore, RecordStore};
