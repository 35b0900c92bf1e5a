//! # Access Checks
//!
//! Capability predicates keyed by object type and optionally field name.
//! A denial is not an error: callers skip the mutation and signal absence.

mod policy;

pub use policy::{
    check_access, AccessOperation, AccessPolicy, Denial, ObjectAccess, ObjectPermissions,
};
