//! Lead procedures

use super::errors::{DmlError, DmlResult};
use super::service::{assigned_id, DmlService, Outcome};
use crate::access::AccessOperation;
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::SaveMode;

impl DmlService {
    /// Bulk-insert `count` leads, then delete them all.
    ///
    /// Returns the ids that existed between the two batches. Both
    /// capabilities are checked before either batch runs.
    pub fn insert_and_delete_leads(&self, count: usize) -> DmlResult<Option<Vec<RecordId>>> {
        self.observe("INSERT_AND_DELETE_LEADS", || {
            let settings = &self.config().lead;
            if count > settings.max_batch {
                return Err(DmlError::BatchTooLarge {
                    requested: count,
                    max: settings.max_batch,
                });
            }
            if count == 0 {
                return Ok(Outcome::Done(Vec::new()));
            }

            let mut leads: Vec<Record> = (1..=count)
                .map(|n| {
                    Record::new(ObjectType::Lead)
                        .with_field(
                            fields::LAST_NAME,
                            format!("{} {}", settings.last_name_prefix, n),
                        )
                        .with_field(fields::COMPANY, settings.company.as_str())
                })
                .collect();

            if let Err(denial) = self.permit_save(&leads) {
                return Ok(Outcome::Denied(denial));
            }
            if let Err(denial) = self.permit(AccessOperation::Delete, ObjectType::Lead, []) {
                return Ok(Outcome::Denied(denial));
            }

            self.save(&mut leads, SaveMode::Insert)?;
            let ids = leads
                .iter()
                .map(assigned_id)
                .collect::<DmlResult<Vec<_>>>()?;
            self.delete(&leads)?;

            Ok(Outcome::Done(ids))
        })
    }
}
