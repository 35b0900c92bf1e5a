//! # Record Store Errors

use thiserror::Error;

use crate::sobject::{ObjectType, RecordId, SchemaViolation};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store failures. Any of these fails the whole batch.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // Validation errors
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    #[error("{0}: cannot insert a record that already has an id")]
    IdOnInsert(ObjectType),

    #[error("{0}: cannot update a record without an id")]
    MissingId(ObjectType),

    #[error("Duplicate id in batch: {0}")]
    DuplicateIdInBatch(RecordId),

    #[error("{object}: id {id} does not belong to this object")]
    WrongObjectForId { object: ObjectType, id: RecordId },

    // Lookup errors
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("{field} references missing record {id}")]
    InvalidReference { field: String, id: String },

    // Internal
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Stable error code for callers and logs
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Schema(SchemaViolation::RequiredFieldMissing { .. }) => {
                "REQUIRED_FIELD_MISSING"
            }
            StoreError::Schema(SchemaViolation::UnknownField { .. }) => "INVALID_FIELD",
            StoreError::Schema(SchemaViolation::InvalidFieldValue { .. }) => {
                "INVALID_FIELD_VALUE"
            }
            StoreError::IdOnInsert(_) => "INVALID_FIELD_FOR_INSERT",
            StoreError::MissingId(_) => "MISSING_ID",
            StoreError::DuplicateIdInBatch(_) => "DUPLICATE_ID_IN_BATCH",
            StoreError::WrongObjectForId { .. } => "INVALID_ID_FOR_OBJECT",
            StoreError::NotFound(_) => "ENTITY_IS_DELETED",
            StoreError::InvalidReference { .. } => "INVALID_CROSS_REFERENCE_KEY",
            StoreError::LockPoisoned => "STORE_UNAVAILABLE",
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned
    }
}
