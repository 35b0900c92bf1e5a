//! # DML Procedures
//!
//! Short, independent record-manipulation procedures over the business
//! objects. Each one builds or queries records, checks capabilities for
//! everything it is about to touch, then calls one or two store primitives.
//!
//! ## Conventions
//! - `Ok(None)`: an access check refused; the store was not mutated
//! - `Err(_)`: the store failed or the input was unusable
//! - No retries, no partial-success reporting

mod account;
mod case;
mod contact;
mod errors;
mod lead;
mod linker;
mod opportunity;
mod service;

pub use account::AccountDraft;
pub use errors::{DmlError, DmlResult};
pub use linker::{LinkOutcome, LinkSpec};
pub use service::DmlService;
