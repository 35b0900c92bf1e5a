//! DML error types
//!
//! Permission denials are not errors: procedures return `Ok(None)` for
//! those. Everything here is fatal to the procedure call.

use thiserror::Error;

use crate::config::ConfigError;
use crate::sobject::{ObjectType, RecordId};
use crate::store::StoreError;

/// DML result type
pub type DmlResult<T> = Result<T, DmlError>;

#[derive(Debug, Error)]
pub enum DmlError {
    /// The store rejected a query, save or delete
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{object} {id} not found")]
    RecordNotFound { object: ObjectType, id: RecordId },

    #[error("{object} record has no {field} to match on")]
    MissingName { object: ObjectType, field: String },

    #[error("Expected {expected} record, got {found}")]
    WrongObjectType {
        expected: ObjectType,
        found: ObjectType,
    },

    #[error("Batch of {requested} exceeds limit of {max}")]
    BatchTooLarge { requested: usize, max: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DmlError {
    /// Stable error code for callers and logs
    pub fn code(&self) -> &'static str {
        match self {
            DmlError::Store(err) => err.code(),
            DmlError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            DmlError::MissingName { .. } => "MISSING_NAME",
            DmlError::WrongObjectType { .. } => "WRONG_OBJECT_TYPE",
            DmlError::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            DmlError::Config(_) => "INVALID_CONFIG",
        }
    }
}
