//! # Capability Predicates
//!
//! "Can I perform this operation on this object/field" checks consulted
//! before every mutation.
//!
//! ## Invariants
//! - A denied field denies the whole mutation (no partial application)
//! - Delete is an object-level capability only
//! - Checks are pure: no store access, no side effects

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::sobject::ObjectType;

/// Kind of access being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOperation {
    Read,
    Create,
    Update,
    Delete,
}

impl AccessOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOperation::Read => "read",
            AccessOperation::Create => "create",
            AccessOperation::Update => "update",
            AccessOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Externally supplied capability predicates
pub trait AccessPolicy: Send + Sync {
    /// Can records of `object` be created, optionally setting `field`
    fn can_create(&self, object: ObjectType, field: Option<&str>) -> bool;

    /// Can records of `object` be updated, optionally changing `field`
    fn can_update(&self, object: ObjectType, field: Option<&str>) -> bool;

    /// Can records of `object` be deleted
    fn can_delete(&self, object: ObjectType) -> bool;

    /// Can `field` of `object` be read
    fn can_read(&self, _object: ObjectType, _field: Option<&str>) -> bool {
        true
    }
}

/// The first capability a policy refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub operation: AccessOperation,
    pub object: ObjectType,
    pub field: Option<String>,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{} denied on {}.{}", self.operation, self.object, field),
            None => write!(f, "{} denied on {}", self.operation, self.object),
        }
    }
}

/// Check an operation against the object and every touched field.
///
/// Returns the first denial, checking the object itself before fields.
pub fn check_access<'a>(
    policy: &dyn AccessPolicy,
    operation: AccessOperation,
    object: ObjectType,
    fields: impl IntoIterator<Item = &'a str>,
) -> Result<(), Denial> {
    let allowed = |field: Option<&str>| match operation {
        AccessOperation::Read => policy.can_read(object, field),
        AccessOperation::Create => policy.can_create(object, field),
        AccessOperation::Update => policy.can_update(object, field),
        AccessOperation::Delete => policy.can_delete(object),
    };

    if !allowed(None) {
        return Err(Denial {
            operation,
            object,
            field: None,
        });
    }

    if operation == AccessOperation::Delete {
        return Ok(());
    }

    for field in fields {
        if !allowed(Some(field)) {
            return Err(Denial {
                operation,
                object,
                field: Some(field.to_string()),
            });
        }
    }

    Ok(())
}

/// Object-level capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectAccess {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl ObjectAccess {
    pub const FULL: ObjectAccess = ObjectAccess {
        read: true,
        create: true,
        update: true,
        delete: true,
    };

    pub const NONE: ObjectAccess = ObjectAccess {
        read: false,
        create: false,
        update: false,
        delete: false,
    };

    pub const READ_ONLY: ObjectAccess = ObjectAccess {
        read: true,
        create: false,
        update: false,
        delete: false,
    };

    fn allows(&self, operation: AccessOperation) -> bool {
        match operation {
            AccessOperation::Read => self.read,
            AccessOperation::Create => self.create,
            AccessOperation::Update => self.update,
            AccessOperation::Delete => self.delete,
        }
    }
}

/// Default `AccessPolicy`: per-object flags plus per-field deny lists
#[derive(Debug, Clone)]
pub struct ObjectPermissions {
    /// Flags per object
    objects: HashMap<ObjectType, ObjectAccess>,

    /// Flags for objects without explicit entry
    default_access: ObjectAccess,

    /// Fields denied per object and operation
    denied_fields: HashMap<(ObjectType, AccessOperation), HashSet<String>>,
}

impl ObjectPermissions {
    /// Every capability granted
    pub fn allow_all() -> Self {
        Self {
            objects: HashMap::new(),
            default_access: ObjectAccess::FULL,
            denied_fields: HashMap::new(),
        }
    }

    /// Every capability refused
    pub fn deny_all() -> Self {
        Self {
            objects: HashMap::new(),
            default_access: ObjectAccess::NONE,
            denied_fields: HashMap::new(),
        }
    }

    pub fn with_object(mut self, object: ObjectType, access: ObjectAccess) -> Self {
        self.objects.insert(object, access);
        self
    }

    pub fn with_default_access(mut self, access: ObjectAccess) -> Self {
        self.default_access = access;
        self
    }

    /// Refuse one field for one operation
    pub fn deny_field(mut self, object: ObjectType, operation: AccessOperation, field: &str) -> Self {
        self.denied_fields
            .entry((object, operation))
            .or_default()
            .insert(field.to_string());
        self
    }

    fn get_access(&self, object: ObjectType) -> ObjectAccess {
        self.objects
            .get(&object)
            .copied()
            .unwrap_or(self.default_access)
    }

    fn allows(&self, operation: AccessOperation, object: ObjectType, field: Option<&str>) -> bool {
        if !self.get_access(object).allows(operation) {
            return false;
        }

        match field {
            Some(field) => !self
                .denied_fields
                .get(&(object, operation))
                .is_some_and(|denied| denied.contains(field)),
            None => true,
        }
    }
}

impl Default for ObjectPermissions {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl AccessPolicy for ObjectPermissions {
    fn can_create(&self, object: ObjectType, field: Option<&str>) -> bool {
        self.allows(AccessOperation::Create, object, field)
    }

    fn can_update(&self, object: ObjectType, field: Option<&str>) -> bool {
        self.allows(AccessOperation::Update, object, field)
    }

    fn can_delete(&self, object: ObjectType) -> bool {
        self.allows(AccessOperation::Delete, object, None)
    }

    fn can_read(&self, object: ObjectType, field: Option<&str>) -> bool {
        self.allows(AccessOperation::Read, object, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sobject::fields;

    #[test]
    fn test_allow_all() {
        let policy = ObjectPermissions::allow_all();
        assert!(policy.can_create(ObjectType::Account, Some(fields::NAME)));
        assert!(policy.can_update(ObjectType::Case, Some(fields::STATUS)));
        assert!(policy.can_delete(ObjectType::Lead));
    }

    #[test]
    fn test_deny_all() {
        let policy = ObjectPermissions::deny_all();
        assert!(!policy.can_create(ObjectType::Account, None));
        assert!(!policy.can_read(ObjectType::Account, Some(fields::NAME)));
        assert!(!policy.can_delete(ObjectType::Lead));
    }

    #[test]
    fn test_object_override() {
        let policy =
            ObjectPermissions::allow_all().with_object(ObjectType::Lead, ObjectAccess::READ_ONLY);
        assert!(policy.can_read(ObjectType::Lead, None));
        assert!(!policy.can_create(ObjectType::Lead, Some(fields::COMPANY)));
        assert!(!policy.can_delete(ObjectType::Lead));
        assert!(policy.can_delete(ObjectType::Account));
    }

    #[test]
    fn test_field_denial_is_operation_specific() {
        let policy = ObjectPermissions::allow_all().deny_field(
            ObjectType::Account,
            AccessOperation::Update,
            fields::DESCRIPTION,
        );
        assert!(policy.can_create(ObjectType::Account, Some(fields::DESCRIPTION)));
        assert!(!policy.can_update(ObjectType::Account, Some(fields::DESCRIPTION)));
        assert!(policy.can_update(ObjectType::Account, Some(fields::NAME)));
        assert!(policy.can_update(ObjectType::Account, None));
    }

    #[test]
    fn test_check_access_reports_first_denied_field() {
        let policy = ObjectPermissions::allow_all().deny_field(
            ObjectType::Contact,
            AccessOperation::Create,
            fields::ACCOUNT_ID,
        );
        let denial = check_access(
            &policy,
            AccessOperation::Create,
            ObjectType::Contact,
            [fields::FIRST_NAME, fields::ACCOUNT_ID, fields::LAST_NAME],
        )
        .unwrap_err();
        assert_eq!(denial.field.as_deref(), Some(fields::ACCOUNT_ID));
        assert_eq!(denial.to_string(), "create denied on Contact.AccountId");
    }

    #[test]
    fn test_check_access_object_level_first() {
        let policy = ObjectPermissions::deny_all();
        let denial =
            check_access(&policy, AccessOperation::Delete, ObjectType::Lead, []).unwrap_err();
        assert_eq!(denial.field, None);
        assert_eq!(denial.to_string(), "delete denied on Lead");
    }

    #[test]
    fn test_delete_ignores_fields() {
        let policy = ObjectPermissions::allow_all().deny_field(
            ObjectType::Lead,
            AccessOperation::Delete,
            fields::COMPANY,
        );
        assert!(check_access(
            &policy,
            AccessOperation::Delete,
            ObjectType::Lead,
            [fields::COMPANY]
        )
        .is_ok());
    }
}
