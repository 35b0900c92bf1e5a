//! DML Service
//!
//! Holds the collaborators every procedure needs: the record store, the
//! access policy, the config and the counters. Procedures are defined in
//! the per-object modules as `impl DmlService` blocks.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::errors::{DmlError, DmlResult};
use crate::access::{check_access, AccessOperation, AccessPolicy, Denial};
use crate::config::DmlConfig;
use crate::observability::{
    log_event_with_fields, DmlMetrics, Event, MetricsSnapshot, ObservationScope,
};
use crate::sobject::{ObjectType, Record, RecordId};
use crate::store::{Criteria, RecordStore, SaveMode, StoreError};

/// Result of a procedure body: done, or skipped by an access check
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Done(T),
    Denied(Denial),
}

/// Entry point for every procedure
pub struct DmlService {
    store: Arc<dyn RecordStore>,
    access: Arc<dyn AccessPolicy>,
    config: DmlConfig,
    metrics: Arc<DmlMetrics>,
}

impl DmlService {
    pub fn new(store: Arc<dyn RecordStore>, access: Arc<dyn AccessPolicy>) -> Self {
        Self {
            store,
            access,
            config: DmlConfig::default(),
            metrics: Arc::new(DmlMetrics::new()),
        }
    }

    /// Replace the config after validating it. Its logging section becomes
    /// the process-wide log threshold.
    pub fn with_config(mut self, config: DmlConfig) -> DmlResult<Self> {
        config.validate()?;
        config.logging.apply();
        self.config = config;
        Ok(self)
    }

    /// Share a counter set with other services
    pub fn with_metrics(mut self, metrics: Arc<DmlMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &DmlConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// Run a procedure body inside an observation scope
    pub(crate) fn observe<T>(
        &self,
        name: &'static str,
        body: impl FnOnce() -> DmlResult<Outcome<T>>,
    ) -> DmlResult<Option<T>> {
        let scope = ObservationScope::new(name);
        match body() {
            Ok(Outcome::Done(value)) => {
                scope.complete();
                Ok(Some(value))
            }
            Ok(Outcome::Denied(denial)) => {
                scope.skipped(&denial.to_string());
                Ok(None)
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(err)
            }
        }
    }

    /// Check one operation on an object and the fields it touches
    pub(crate) fn permit<'a>(
        &self,
        operation: AccessOperation,
        object: ObjectType,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), Denial> {
        check_access(self.access.as_ref(), operation, object, fields).map_err(|denial| {
            self.metrics.increment_permission_denials();
            let field = denial.field.clone().unwrap_or_default();
            log_event_with_fields(
                Event::PermissionDenied,
                &[
                    ("operation", denial.operation.as_str()),
                    ("object", denial.object.api_name()),
                    ("field", &field),
                ],
            );
            denial
        })
    }

    /// Check create (new records) or update (saved records) on every field
    /// each record carries
    pub(crate) fn permit_save(&self, records: &[Record]) -> Result<(), Denial> {
        for record in records {
            let operation = if record.is_new() {
                AccessOperation::Create
            } else {
                AccessOperation::Update
            };
            self.permit(operation, record.object_type, record.field_names())?;
        }
        Ok(())
    }

    pub(crate) fn query(&self, object: ObjectType, criteria: &Criteria) -> DmlResult<Vec<Record>> {
        let rows = self
            .store
            .query(object, criteria)
            .map_err(|err| self.store_failure("query", object, err))?;

        self.metrics.increment_queries();
        log_event_with_fields(
            Event::QueryExecuted,
            &[("object", object.api_name()), ("rows", &rows.len().to_string())],
        );
        Ok(rows)
    }

    pub(crate) fn save(&self, records: &mut [Record], mode: SaveMode) -> DmlResult<()> {
        let Some(object) = records.first().map(|r| r.object_type) else {
            return Ok(());
        };
        let inserted = records.iter().filter(|r| r.is_new()).count() as u64;
        let updated = records.len() as u64 - inserted;

        self.store
            .save(records, mode)
            .map_err(|err| self.store_failure(mode.as_str(), object, err))?;

        self.metrics.add_inserted(inserted);
        self.metrics.add_updated(updated);
        let event = match mode {
            SaveMode::Insert => Event::RecordsInserted,
            SaveMode::Update => Event::RecordsUpdated,
            SaveMode::Upsert => Event::RecordsUpserted,
        };
        log_event_with_fields(
            event,
            &[
                ("object", object.api_name()),
                ("count", &records.len().to_string()),
            ],
        );
        Ok(())
    }

    pub(crate) fn delete(&self, records: &[Record]) -> DmlResult<()> {
        let Some(object) = records.first().map(|r| r.object_type) else {
            return Ok(());
        };

        self.store
            .delete(records)
            .map_err(|err| self.store_failure("delete", object, err))?;

        self.metrics.add_deleted(records.len() as u64);
        log_event_with_fields(
            Event::RecordsDeleted,
            &[
                ("object", object.api_name()),
                ("count", &records.len().to_string()),
            ],
        );
        Ok(())
    }

    fn store_failure(&self, primitive: &str, object: ObjectType, err: StoreError) -> DmlError {
        self.metrics.increment_store_failures();
        log_event_with_fields(
            Event::StoreFailure,
            &[
                ("primitive", primitive),
                ("object", object.api_name()),
                ("code", err.code()),
                ("message", &err.to_string()),
            ],
        );
        DmlError::Store(err)
    }
}

/// Id the store assigned to a just-saved record
pub(crate) fn assigned_id(record: &Record) -> DmlResult<RecordId> {
    record
        .id
        .clone()
        .ok_or(DmlError::Store(StoreError::MissingId(record.object_type)))
}

/// Fail unless every record is of the expected object type
pub(crate) fn ensure_object(expected: ObjectType, records: &[Record]) -> DmlResult<()> {
    match records.iter().find(|r| r.object_type != expected) {
        Some(record) => Err(DmlError::WrongObjectType {
            expected,
            found: record.object_type,
        }),
        None => Ok(()),
    }
}
