//! Contact procedures
//!
//! Linking contacts to accounts by last name lives in `linker`.

use super::errors::DmlResult;
use super::service::{assigned_id, DmlService, Outcome};
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::SaveMode;

impl DmlService {
    /// Insert one Contact, optionally attached to an Account
    pub fn create_contact(
        &self,
        first_name: Option<&str>,
        last_name: &str,
        account_id: Option<&RecordId>,
    ) -> DmlResult<Option<RecordId>> {
        self.observe("CREATE_CONTACT", || {
            let mut contact =
                Record::new(ObjectType::Contact).with_field(fields::LAST_NAME, last_name);
            if let Some(first_name) = first_name {
                contact.set(fields::FIRST_NAME, first_name);
            }
            if let Some(account_id) = account_id {
                contact.set(fields::ACCOUNT_ID, account_id);
            }

            let mut batch = [contact];
            if let Err(denial) = self.permit_save(&batch) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut batch, SaveMode::Insert)?;
            Ok(Outcome::Done(assigned_id(&batch[0])?))
        })
    }
}
