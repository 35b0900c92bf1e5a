//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE`, `{name}_SKIPPED` or `{name}_FAILED` on exit
//! - Logs `{name}_INCOMPLETE` on drop if none of those happened
//!
//! Every line carries the scope's invocation id.

use std::cell::Cell;
use std::time::Instant;

use uuid::Uuid;

use super::logger::Logger;

/// A scope that logs the lifecycle of one procedure call
///
/// ```ignore
/// let scope = ObservationScope::new("INSERT_ACCOUNT");
/// // ... do work ...
/// scope.complete(); // logs INSERT_ACCOUNT_COMPLETE
/// ```
pub struct ObservationScope {
    name: &'static str,
    invocation_id: String,
    started_at: Instant,
    completed: Cell<bool>,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        let invocation_id = Uuid::new_v4().to_string();
        Logger::info(&format!("{}_BEGIN", name), &[("invocation", &invocation_id)]);

        Self {
            name,
            invocation_id,
            started_at: Instant::now(),
            completed: Cell::new(false),
        }
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn elapsed_ms(&self) -> String {
        self.started_at.elapsed().as_millis().to_string()
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(self, extra_fields: &[(&str, &str)]) {
        self.finish("COMPLETE", extra_fields, false);
    }

    /// The mutation was skipped by an access check
    pub fn skipped(self, reason: &str) {
        self.finish("SKIPPED", &[("reason", reason)], false);
    }

    /// The procedure failed; logged at ERROR
    pub fn fail(self, reason: &str) {
        self.finish("FAILED", &[("reason", reason)], true);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }

    fn finish(&self, suffix: &str, extra_fields: &[(&str, &str)], error: bool) {
        self.completed.set(true);
        let event = format!("{}_{}", self.name, suffix);
        let elapsed = self.elapsed_ms();

        let mut fields: Vec<(&str, &str)> = vec![
            ("invocation", self.invocation_id.as_str()),
            ("elapsed_ms", elapsed.as_str()),
        ];
        fields.extend(extra_fields.iter().copied());

        if error {
            Logger::error(&event, &fields);
        } else {
            Logger::info(&event, &fields);
        }
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed.get() {
            let event = format!("{}_INCOMPLETE", self.name);
            Logger::warn(
                &event,
                &[
                    ("invocation", self.invocation_id.as_str()),
                    ("reason", "scope dropped without completion"),
                ],
            );
        }
    }
}
