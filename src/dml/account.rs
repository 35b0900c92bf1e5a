//! Account procedures

use super::errors::{DmlError, DmlResult};
use super::service::{assigned_id, ensure_object, DmlService, Outcome};
use crate::access::AccessOperation;
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::{Criteria, SaveMode};

/// Field values for a new Account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDraft {
    pub name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
}

impl AccountDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Only fields that are set end up on the record
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(ObjectType::Account).with_field(fields::NAME, self.name.as_str());
        if let Some(industry) = &self.industry {
            record.set(fields::INDUSTRY, industry.as_str());
        }
        if let Some(description) = &self.description {
            record.set(fields::DESCRIPTION, description.as_str());
        }
        record
    }
}

impl DmlService {
    /// Insert one Account with only a Name
    pub fn insert_account(&self, name: &str) -> DmlResult<Option<RecordId>> {
        self.insert_account_with_details(&AccountDraft::new(name))
    }

    /// Insert one Account with whichever of Name, Industry and Description
    /// the draft sets
    pub fn insert_account_with_details(&self, draft: &AccountDraft) -> DmlResult<Option<RecordId>> {
        self.observe("INSERT_ACCOUNT", || {
            let mut batch = [draft.to_record()];
            if let Err(denial) = self.permit_save(&batch) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut batch, SaveMode::Insert)?;
            Ok(Outcome::Done(assigned_id(&batch[0])?))
        })
    }

    /// Query an Account by id, change its Description and save it back
    pub fn update_account_description(
        &self,
        id: &RecordId,
        description: &str,
    ) -> DmlResult<Option<Record>> {
        self.observe("UPDATE_ACCOUNT_DESCRIPTION", || {
            if let Err(denial) =
                self.permit(AccessOperation::Read, ObjectType::Account, [fields::ID])
            {
                return Ok(Outcome::Denied(denial));
            }
            let mut batch = self.query(ObjectType::Account, &Criteria::id_in([id]).limit(1))?;
            if batch.is_empty() {
                return Err(DmlError::RecordNotFound {
                    object: ObjectType::Account,
                    id: id.clone(),
                });
            }

            if let Err(denial) =
                self.permit(AccessOperation::Update, ObjectType::Account, [fields::DESCRIPTION])
            {
                return Ok(Outcome::Denied(denial));
            }
            batch[0].set(fields::DESCRIPTION, description);
            self.save(&mut batch, SaveMode::Update)?;
            Ok(Outcome::Done(batch.remove(0)))
        })
    }

    /// Move every Account in one industry to another; returns how many moved
    pub fn reassign_industry(&self, from: &str, to: &str) -> DmlResult<Option<usize>> {
        self.observe("REASSIGN_INDUSTRY", || {
            if let Err(denial) =
                self.permit(AccessOperation::Read, ObjectType::Account, [fields::INDUSTRY])
            {
                return Ok(Outcome::Denied(denial));
            }
            let mut accounts =
                self.query(ObjectType::Account, &Criteria::all().eq(fields::INDUSTRY, from))?;
            if accounts.is_empty() {
                return Ok(Outcome::Done(0));
            }

            if let Err(denial) =
                self.permit(AccessOperation::Update, ObjectType::Account, [fields::INDUSTRY])
            {
                return Ok(Outcome::Denied(denial));
            }
            for account in &mut accounts {
                account.set(fields::INDUSTRY, to);
            }
            self.save(&mut accounts, SaveMode::Update)?;
            Ok(Outcome::Done(accounts.len()))
        })
    }

    /// Insert or update one Account depending on whether it has an id
    pub fn upsert_account(&self, account: Record) -> DmlResult<Option<RecordId>> {
        self.observe("UPSERT_ACCOUNT", || {
            let mut batch = [account];
            ensure_object(ObjectType::Account, &batch)?;
            if let Err(denial) = self.permit_save(&batch) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut batch, SaveMode::Upsert)?;
            Ok(Outcome::Done(assigned_id(&batch[0])?))
        })
    }

    /// Delete one Account by id; returns the deleted id
    pub fn delete_account(&self, id: &RecordId) -> DmlResult<Option<RecordId>> {
        self.observe("DELETE_ACCOUNT", || {
            if let Err(denial) = self.permit(AccessOperation::Delete, ObjectType::Account, []) {
                return Ok(Outcome::Denied(denial));
            }
            let target = Record::new(ObjectType::Account).with_id(id.clone());
            self.delete(std::slice::from_ref(&target))?;
            Ok(Outcome::Done(id.clone()))
        })
    }
}
