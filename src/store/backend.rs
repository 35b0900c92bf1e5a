//! Record store contract
//!
//! The store owns record lifecycle. Procedures only call these three
//! primitives; they never cache records between calls.

use std::fmt;

use super::criteria::Criteria;
use super::errors::StoreResult;
use crate::sobject::{ObjectType, Record};

/// How `save` treats records with and without ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Every record must be new
    Insert,
    /// Every record must carry the id of an existing record
    Update,
    /// Records with an id are updated, the rest are inserted
    Upsert,
}

impl SaveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveMode::Insert => "insert",
            SaveMode::Update => "update",
            SaveMode::Upsert => "upsert",
        }
    }
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External record store
pub trait RecordStore: Send + Sync {
    /// Filtered read of one object type, in store order
    fn query(&self, object_type: ObjectType, criteria: &Criteria) -> StoreResult<Vec<Record>>;

    /// Persist a batch.
    ///
    /// New records get their ids assigned in place. Any validation error
    /// fails the whole batch and leaves the store unchanged.
    fn save(&self, records: &mut [Record], mode: SaveMode) -> StoreResult<()>;

    /// Remove a batch by id. Whole batch or nothing.
    fn delete(&self, records: &[Record]) -> StoreResult<()>;
}
