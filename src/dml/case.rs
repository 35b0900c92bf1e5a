//! Case procedures

use super::errors::DmlResult;
use super::service::{assigned_id, DmlService, Outcome};
use crate::access::AccessOperation;
use crate::sobject::{fields, ObjectType, Record, RecordId};
use crate::store::{Criteria, SaveMode};

impl DmlService {
    /// Open a Case for an Account with the configured open status
    pub fn open_case(&self, account_id: &RecordId, origin: &str) -> DmlResult<Option<RecordId>> {
        self.observe("OPEN_CASE", || {
            let mut batch = [Record::new(ObjectType::Case)
                .with_field(fields::ORIGIN, origin)
                .with_field(fields::STATUS, self.config().case.open_status.as_str())
                .with_field(fields::ACCOUNT_ID, account_id)];

            if let Err(denial) = self.permit_save(&batch) {
                return Ok(Outcome::Denied(denial));
            }
            self.save(&mut batch, SaveMode::Insert)?;
            Ok(Outcome::Done(assigned_id(&batch[0])?))
        })
    }

    /// Close every not-yet-closed Case of an Account; returns how many
    pub fn close_cases_for_account(&self, account_id: &RecordId) -> DmlResult<Option<usize>> {
        self.observe("CLOSE_CASES_FOR_ACCOUNT", || {
            let closed = self.config().case.closed_status.as_str();

            if let Err(denial) = self.permit(
                AccessOperation::Read,
                ObjectType::Case,
                [fields::ACCOUNT_ID, fields::STATUS],
            ) {
                return Ok(Outcome::Denied(denial));
            }
            let criteria = Criteria::all()
                .eq(fields::ACCOUNT_ID, account_id)
                .ne(fields::STATUS, closed);
            let mut cases = self.query(ObjectType::Case, &criteria)?;
            if cases.is_empty() {
                return Ok(Outcome::Done(0));
            }

            if let Err(denial) =
                self.permit(AccessOperation::Update, ObjectType::Case, [fields::STATUS])
            {
                return Ok(Outcome::Denied(denial));
            }
            for case in &mut cases {
                case.set(fields::STATUS, closed);
            }
            self.save(&mut cases, SaveMode::Update)?;
            Ok(Outcome::Done(cases.len()))
        })
    }
}
