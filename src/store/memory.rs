//! In-memory record store
//!
//! Reference implementation of `RecordStore`. Ids are allocated from a
//! single monotonic sequence, so iterating an object's table by id yields
//! records in insertion order.
//!
//! Every batch is validated in full before anything is applied; a failed
//! batch leaves the store untouched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use super::backend::{RecordStore, SaveMode};
use super::criteria::Criteria;
use super::errors::{StoreError, StoreResult};
use crate::sobject::{FieldKind, ObjectSchema, ObjectType, Record, RecordId};

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<ObjectType, BTreeMap<RecordId, Record>>,
    last_sequence: u64,
}

impl StoreState {
    fn get(&self, object_type: ObjectType, id: &RecordId) -> Option<&Record> {
        self.tables.get(&object_type).and_then(|t| t.get(id))
    }

    fn next_id(&mut self, object_type: ObjectType) -> RecordId {
        self.last_sequence += 1;
        RecordId::from_sequence(object_type, self.last_sequence)
    }

    /// Merge an incoming record over what is stored (or take it as-is when
    /// new) and validate the result.
    fn prepare(
        &self,
        record: &Record,
        mode: SaveMode,
        seen: &mut HashSet<RecordId>,
    ) -> StoreResult<Record> {
        let merged = match (&record.id, mode) {
            (Some(_), SaveMode::Insert) => return Err(StoreError::IdOnInsert(record.object_type)),
            (None, SaveMode::Update) => return Err(StoreError::MissingId(record.object_type)),
            (None, _) => record.clone(),
            (Some(id), _) => {
                if id.object_type() != Some(record.object_type) {
                    return Err(StoreError::WrongObjectForId {
                        object: record.object_type,
                        id: id.clone(),
                    });
                }
                if !seen.insert(id.clone()) {
                    return Err(StoreError::DuplicateIdInBatch(id.clone()));
                }
                let mut merged = self
                    .get(record.object_type, id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                merged
                    .fields
                    .extend(record.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
        };

        let schema = ObjectSchema::of(merged.object_type);
        schema.validate(&merged)?;

        for (def, referenced) in schema.references(&merged) {
            if let FieldKind::Reference(target) = def.kind {
                if self.get(target, &RecordId::new(referenced)).is_none() {
                    return Err(StoreError::InvalidReference {
                        field: def.name.to_string(),
                        id: referenced.to_string(),
                    });
                }
            }
        }

        Ok(merged)
    }
}

/// Thread-safe in-memory record store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single record by id
    pub fn get(&self, id: &RecordId) -> StoreResult<Option<Record>> {
        let Some(object_type) = id.object_type() else {
            return Ok(None);
        };
        let state = self.data.read()?;
        Ok(state.get(object_type, id).cloned())
    }

    /// Number of stored records of one object type
    pub fn count(&self, object_type: ObjectType) -> StoreResult<usize> {
        let state = self.data.read()?;
        Ok(state.tables.get(&object_type).map_or(0, BTreeMap::len))
    }
}

impl RecordStore for InMemoryStore {
    fn query(&self, object_type: ObjectType, criteria: &Criteria) -> StoreResult<Vec<Record>> {
        let state = self.data.read()?;
        let Some(table) = state.tables.get(&object_type) else {
            return Ok(Vec::new());
        };

        let limit = criteria.limit.unwrap_or(usize::MAX);
        Ok(table
            .values()
            .filter(|record| criteria.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }

    fn save(&self, records: &mut [Record], mode: SaveMode) -> StoreResult<()> {
        let mut state = self.data.write()?;

        let mut seen = HashSet::new();
        let prepared = records
            .iter()
            .map(|record| state.prepare(record, mode, &mut seen))
            .collect::<StoreResult<Vec<_>>>()?;

        for (record, mut merged) in records.iter_mut().zip(prepared) {
            let id = match merged.id.clone() {
                Some(id) => id,
                None => state.next_id(merged.object_type),
            };
            merged.id = Some(id.clone());
            state
                .tables
                .entry(merged.object_type)
                .or_default()
                .insert(id.clone(), merged);
            record.id = Some(id);
        }

        Ok(())
    }

    fn delete(&self, records: &[Record]) -> StoreResult<()> {
        let mut state = self.data.write()?;

        let mut seen = HashSet::new();
        for record in records {
            let id = record
                .id
                .as_ref()
                .ok_or(StoreError::MissingId(record.object_type))?;
            if !seen.insert(id.clone()) {
                return Err(StoreError::DuplicateIdInBatch(id.clone()));
            }
            if state.get(record.object_type, id).is_none() {
                return Err(StoreError::NotFound(id.clone()));
            }
        }

        for record in records {
            if let (Some(table), Some(id)) =
                (state.tables.get_mut(&record.object_type), record.id.as_ref())
            {
                table.remove(id);
            }
        }

        Ok(())
    }
}
