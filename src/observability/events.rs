//! Observable events
//!
//! Every event the procedures emit is explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Store round trips
    /// Query executed
    QueryExecuted,
    /// Batch inserted
    RecordsInserted,
    /// Batch updated
    RecordsUpdated,
    /// Batch upserted
    RecordsUpserted,
    /// Batch deleted
    RecordsDeleted,
    /// Store rejected a batch
    StoreFailure,

    // Access
    /// Capability check refused, mutation skipped
    PermissionDenied,

    // Linking
    /// Targets created for names with no match
    LinkTargetsCreated,
    /// Linking record had no target with its name
    LinkUnmatched,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::RecordsInserted => "RECORDS_INSERTED",
            Event::RecordsUpdated => "RECORDS_UPDATED",
            Event::RecordsUpserted => "RECORDS_UPSERTED",
            Event::RecordsDeleted => "RECORDS_DELETED",
            Event::StoreFailure => "STORE_FAILURE",
            Event::PermissionDenied => "PERMISSION_DENIED",
            Event::LinkTargetsCreated => "LINK_TARGETS_CREATED",
            Event::LinkUnmatched => "LINK_UNMATCHED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryExecuted | Event::LinkUnmatched => Severity::Trace,
            Event::PermissionDenied => Severity::Warn,
            Event::StoreFailure => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
