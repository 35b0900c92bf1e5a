//! Query criteria
//!
//! Filters records strictly according to predicates.
//! No type coercion, no expressions, exact match only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sobject::{fields, Record, RecordId};

/// Comparison applied to one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Field equals the value
    Eq(Value),
    /// Field is absent or differs from the value
    Ne(Value),
    /// Field equals one of the values
    In(Vec<Value>),
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
}

/// Conjunction of predicates with an optional row limit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub predicates: Vec<Predicate>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Criteria {
    /// Criteria matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality predicate
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op: FilterOp::Eq(value.into()),
        });
        self
    }

    /// Add an inequality predicate
    pub fn ne(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op: FilterOp::Ne(value.into()),
        });
        self
    }

    /// Add a membership predicate
    pub fn is_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op: FilterOp::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Criteria matching the given ids
    pub fn id_in<'a>(ids: impl IntoIterator<Item = &'a RecordId>) -> Self {
        Self::all().is_in(fields::ID, ids.into_iter().map(Value::from))
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks if a record matches all predicates (AND semantics)
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates
            .iter()
            .all(|pred| matches_predicate(record, pred))
    }
}

fn matches_predicate(record: &Record, predicate: &Predicate) -> bool {
    let id_value;
    let field_value = if predicate.field == fields::ID {
        id_value = record.id.as_ref().map(Value::from);
        id_value.as_ref()
    } else {
        record.get(&predicate.field).filter(|v| !v.is_null())
    };

    match (&predicate.op, field_value) {
        (FilterOp::Eq(expected), Some(actual)) => actual == expected,
        (FilterOp::Ne(expected), Some(actual)) => actual != expected,
        (FilterOp::Ne(_), None) => true,
        (FilterOp::In(values), Some(actual)) => values.contains(actual),
        // Missing field = no match
        (FilterOp::Eq(_), None) | (FilterOp::In(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sobject::ObjectType;

    fn account(name: &str, industry: Option<&str>) -> Record {
        let mut record = Record::new(ObjectType::Account).with_field(fields::NAME, name);
        if let Some(industry) = industry {
            record.set(fields::INDUSTRY, industry);
        }
        record
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(Criteria::all().matches(&account("Acme", None)));
    }

    #[test]
    fn test_eq_is_case_sensitive() {
        let criteria = Criteria::all().eq(fields::NAME, "acme");
        assert!(!criteria.matches(&account("Acme", None)));
        assert!(Criteria::all().eq(fields::NAME, "Acme").matches(&account("Acme", None)));
    }

    #[test]
    fn test_eq_requires_whole_string() {
        let criteria = Criteria::all().eq(fields::NAME, "Acm");
        assert!(!criteria.matches(&account("Acme", None)));
    }

    #[test]
    fn test_in_membership() {
        let criteria = Criteria::all().is_in(fields::NAME, ["Doe", "Jane"]);
        assert!(criteria.matches(&account("Doe", None)));
        assert!(!criteria.matches(&account("Smith", None)));
    }

    #[test]
    fn test_missing_field() {
        let record = account("Acme", None);
        assert!(!Criteria::all().eq(fields::INDUSTRY, "Energy").matches(&record));
        assert!(Criteria::all().ne(fields::INDUSTRY, "Energy").matches(&record));
    }

    #[test]
    fn test_and_semantics() {
        let criteria = Criteria::all()
            .eq(fields::NAME, "Acme")
            .eq(fields::INDUSTRY, "Energy");
        assert!(criteria.matches(&account("Acme", Some("Energy"))));
        assert!(!criteria.matches(&account("Acme", Some("Retail"))));
    }

    #[test]
    fn test_id_pseudo_field() {
        let id = RecordId::from_sequence(ObjectType::Account, 3);
        let saved = account("Acme", None).with_id(id.clone());
        assert!(Criteria::id_in([&id]).matches(&saved));
        assert!(!Criteria::id_in([&id]).matches(&account("Acme", None)));
    }
}
