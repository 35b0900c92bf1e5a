//! Opportunity procedures
//!
//! Two ways of applying the configured defaults (StageName, CloseDate,
//! Amount):
//! - `apply_opportunity_defaults` forces them onto every record given
//! - `create_missing_opportunities` gives them only to records it creates

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::errors::DmlResult;
use super::service::{ensure_object, DmlService, Outcome};
use crate::access::AccessOperation;
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::{Criteria, SaveMode};

impl DmlService {
    fn default_opportunity_fields(&self) -> DmlResult<[(&'static str, Value); 3]> {
        let defaults = &self.config().opportunity;
        let close_date = defaults.close_date_from(self.today())?;
        Ok([
            (fields::STAGE_NAME, Value::from(defaults.stage_name.as_str())),
            (fields::CLOSE_DATE, Value::from(close_date.format("%Y-%m-%d").to_string())),
            (fields::AMOUNT, Value::from(defaults.amount)),
        ])
    }

    /// Force the default StageName, CloseDate and Amount onto every record
    /// and upsert them all
    pub fn apply_opportunity_defaults(
        &self,
        mut opportunities: Vec<Record>,
    ) -> DmlResult<Option<Vec<Record>>> {
        self.observe("APPLY_OPPORTUNITY_DEFAULTS", || {
            ensure_object(ObjectType::Opportunity, &opportunities)?;

            let defaults = self.default_opportunity_fields()?;
            for opportunity in &mut opportunities {
                for (field, value) in &defaults {
                    opportunity.set(field, value.clone());
                }
            }

            if let Err(denial) = self.permit_save(&opportunities) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut opportunities, SaveMode::Upsert)?;
            Ok(Outcome::Done(std::mem::take(&mut opportunities)))
        })
    }

    /// Return one Opportunity per distinct name, creating the missing ones
    /// with default fields. Existing records are returned untouched.
    pub fn create_missing_opportunities(
        &self,
        names: &[&str],
        account_id: Option<&RecordId>,
    ) -> DmlResult<Option<Vec<Record>>> {
        self.observe("CREATE_MISSING_OPPORTUNITIES", || {
            let mut seen = HashSet::new();
            let requested: Vec<&str> = names.iter().copied().filter(|n| seen.insert(*n)).collect();
            if requested.is_empty() {
                return Ok(Outcome::Done(Vec::new()));
            }

            if let Err(denial) =
                self.permit(AccessOperation::Read, ObjectType::Opportunity, [fields::NAME])
            {
                return Ok(Outcome::Denied(denial));
            }
            let existing = self.query(
                ObjectType::Opportunity,
                &Criteria::all().is_in(fields::NAME, requested.iter().copied()),
            )?;

            let mut by_name: HashMap<String, Record> = HashMap::new();
            for record in existing {
                if let Some(name) = record.name().map(str::to_string) {
                    by_name.entry(name).or_insert(record);
                }
            }

            let defaults = self.default_opportunity_fields()?;
            let mut created: Vec<Record> = requested
                .iter()
                .filter(|name| !by_name.contains_key(**name))
                .map(|name| {
                    let mut record =
                        Record::new(ObjectType::Opportunity).with_field(fields::NAME, *name);
                    for (field, value) in &defaults {
                        record.set(field, value.clone());
                    }
                    if let Some(account_id) = account_id {
                        record.set(fields::ACCOUNT_ID, account_id);
                    }
                    record
                })
                .collect();

            if let Err(denial) = self.permit_save(&created) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut created, SaveMode::Insert)?;

            for record in created {
                if let Some(name) = record.name().map(str::to_string) {
                    by_name.insert(name, record);
                }
            }

            Ok(Outcome::Done(
                requested
                    .iter()
                    .filter_map(|name| by_name.remove(*name))
                    .collect(),
            ))
        })
    }
}
