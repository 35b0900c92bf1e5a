//! Observability for the DML procedures
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Per-call observation scopes
//! - Monotonic counters
//!
//! Observability is read-only: it never changes what a procedure does.
//!
//! ```ignore
//! use crmdml::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordsInserted, &[("object", "Account"), ("count", "1")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{DmlMetrics, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
