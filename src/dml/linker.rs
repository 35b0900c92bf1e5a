//! Name-Matching Linker
//!
//! Given linking records that each carry a candidate name, make sure one
//! target record exists per distinct name, then point every linking
//! record's reference field at the target with exactly that name.
//!
//! ## Invariants
//! - Matching is case-sensitive whole-string equality
//! - One new target per distinct missing name
//! - Linking records sharing a name share a target
//! - Targets and linking records are saved as two separate atomic batches
//! - When several stored targets share a name, the first in store order wins

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::errors::{DmlError, DmlResult};
use super::service::{ensure_object, DmlService, Outcome};
use crate::access::AccessOperation;
use crate::observability::{log_event_with_fields, Event};
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::{Criteria, SaveMode};

/// Which objects and fields a linking run connects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpec {
    /// Object created on demand, one per name
    pub target: ObjectType,
    /// Field on the target holding the name
    pub target_name_field: &'static str,
    /// Object carrying names and references
    pub link_object: ObjectType,
    /// Field on the linking record holding the candidate name
    pub link_name_field: &'static str,
    /// Field on the linking record that receives the target id
    pub reference_field: &'static str,
}

impl LinkSpec {
    /// Contact.LastName matched against Account.Name, stored in Contact.AccountId
    pub fn contacts_to_accounts() -> Self {
        Self {
            target: ObjectType::Account,
            target_name_field: fields::NAME,
            link_object: ObjectType::Contact,
            link_name_field: fields::LAST_NAME,
            reference_field: fields::ACCOUNT_ID,
        }
    }
}

/// What a linking run produced
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    /// Every target involved, pre-existing first, in store order
    pub targets: Vec<Record>,
    /// The linking records as saved, in input order
    pub links: Vec<Record>,
    /// Targets created by this run
    pub created: usize,
    /// Linking records left without a reference
    pub unmatched: usize,
}

impl LinkOutcome {
    /// Id of the target a linking record now references
    pub fn reference_of(&self, spec: &LinkSpec, index: usize) -> Option<RecordId> {
        self.links
            .get(index)
            .and_then(|r| r.get_str(spec.reference_field))
            .map(RecordId::new)
    }
}

/// Distinct names in first-seen order
fn gather_names(spec: &LinkSpec, links: &[Record]) -> DmlResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for record in links {
        let name = record
            .get_str(spec.link_name_field)
            .ok_or_else(|| DmlError::MissingName {
                object: record.object_type,
                field: spec.link_name_field.to_string(),
            })?;
        if seen.insert(name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// New targets for every requested name absent from `existing`
fn missing_targets(spec: &LinkSpec, names: &[String], existing: &[Record]) -> Vec<Record> {
    let found: HashSet<&str> = existing
        .iter()
        .filter_map(|r| r.get_str(spec.target_name_field))
        .collect();

    names
        .iter()
        .filter(|name| !found.contains(name.as_str()))
        .map(|name| Record::new(spec.target).with_field(spec.target_name_field, name.as_str()))
        .collect()
}

/// Point each linking record at its target; returns how many found none
fn assign_references(spec: &LinkSpec, targets: &[Record], links: &mut [Record]) -> usize {
    let mut by_name: HashMap<&str, &RecordId> = HashMap::new();
    for target in targets {
        if let (Some(name), Some(id)) = (target.get_str(spec.target_name_field), &target.id) {
            by_name.entry(name).or_insert(id);
        }
    }

    let mut unmatched = 0;
    for record in links.iter_mut() {
        let target_id = record
            .get_str(spec.link_name_field)
            .and_then(|name| by_name.get(name))
            .map(|id| Value::from(*id));

        match target_id {
            Some(id) => record.set(spec.reference_field, id),
            None => {
                unmatched += 1;
                log_event_with_fields(
                    Event::LinkUnmatched,
                    &[("object", record.object_type.api_name())],
                );
            }
        }
    }
    unmatched
}

impl DmlService {
    /// Ensure a target per distinct name and link every record to it
    pub fn link_by_name(
        &self,
        spec: &LinkSpec,
        mut links: Vec<Record>,
    ) -> DmlResult<Option<LinkOutcome>> {
        self.observe("LINK_BY_NAME", || {
            ensure_object(spec.link_object, &links)?;
            let names = gather_names(spec, &links)?;
            if names.is_empty() {
                return Ok(Outcome::Done(LinkOutcome {
                    targets: Vec::new(),
                    links: Vec::new(),
                    created: 0,
                    unmatched: 0,
                }));
            }

            if let Err(denial) =
                self.permit(AccessOperation::Read, spec.target, [spec.target_name_field])
            {
                return Ok(Outcome::Denied(denial));
            }
            let criteria = Criteria::all().is_in(spec.target_name_field, names.iter().cloned());
            let mut targets = self.query(spec.target, &criteria)?;

            let mut new_targets = missing_targets(spec, &names, &targets);
            let created = new_targets.len();
            if let Err(denial) = self.permit_save(&new_targets) {
                return Ok(Outcome::Denied(denial));
            }

            // Linking records will carry the reference field whether or not
            // they had one before
            for record in &links {
                let operation = if record.is_new() {
                    AccessOperation::Create
                } else {
                    AccessOperation::Update
                };
                let touched = record
                    .field_names()
                    .chain(std::iter::once(spec.reference_field));
                if let Err(denial) = self.permit(operation, record.object_type, touched) {
                    return Ok(Outcome::Denied(denial));
                }
            }

            // Existing targets stay untouched
            self.save(&mut new_targets, SaveMode::Insert)?;
            targets.extend(new_targets);
            if created > 0 {
                log_event_with_fields(
                    Event::LinkTargetsCreated,
                    &[
                        ("object", spec.target.api_name()),
                        ("count", &created.to_string()),
                    ],
                );
            }

            let unmatched = assign_references(spec, &targets, &mut links);
            self.save(&mut links, SaveMode::Upsert)?;

            Ok(Outcome::Done(LinkOutcome {
                targets,
                links: std::mem::take(&mut links),
                created,
                unmatched,
            }))
        })
    }

    /// Make sure an Account exists for every contact's last name and attach
    /// each contact to it
    pub fn upsert_accounts_with_contacts(
        &self,
        contacts: Vec<Record>,
    ) -> DmlResult<Option<LinkOutcome>> {
        self.link_by_name(&LinkSpec::contacts_to_accounts(), contacts)
    }
}
