//! # Record Store
//!
//! The external data store the procedures delegate to.
//!
//! ## Contract
//! - `query` is a filtered read by equality/membership predicates
//! - `save` assigns ids to new records and fails the whole batch on any
//!   validation error
//! - `delete` removes records by id, whole batch or nothing

mod backend;
mod criteria;
mod errors;
mod memory;

pub use backend::{RecordStore, SaveMode};
pub use criteria::{Criteria, FilterOp, Predicate};
pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryStore;
