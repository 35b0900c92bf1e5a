//! Object type definitions
//!
//! The five business objects the procedures operate on, their platform API
//! names, id key prefixes and the field names each procedure touches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field API names shared across objects
pub mod fields {
    /// Pseudo-field matching the record identifier in criteria
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const INDUSTRY: &str = "Industry";
    pub const DESCRIPTION: &str = "Description";
    pub const FIRST_NAME: &str = "FirstName";
    pub const LAST_NAME: &str = "LastName";
    pub const ACCOUNT_ID: &str = "AccountId";
    pub const STAGE_NAME: &str = "StageName";
    pub const CLOSE_DATE: &str = "CloseDate";
    pub const AMOUNT: &str = "Amount";
    pub const COMPANY: &str = "Company";
    pub const ORIGIN: &str = "Origin";
    pub const STATUS: &str = "Status";
}

/// Business objects owned by the external platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    Account,
    Contact,
    Opportunity,
    Lead,
    Case,
}

impl ObjectType {
    /// All object types, in declaration order
    pub const ALL: [ObjectType; 5] = [
        ObjectType::Account,
        ObjectType::Contact,
        ObjectType::Opportunity,
        ObjectType::Lead,
        ObjectType::Case,
    ];

    /// Platform API name
    pub fn api_name(&self) -> &'static str {
        match self {
            ObjectType::Account => "Account",
            ObjectType::Contact => "Contact",
            ObjectType::Opportunity => "Opportunity",
            ObjectType::Lead => "Lead",
            ObjectType::Case => "Case",
        }
    }

    /// Three-character prefix carried by every id of this object
    pub fn key_prefix(&self) -> &'static str {
        match self {
            ObjectType::Account => "001",
            ObjectType::Contact => "003",
            ObjectType::Opportunity => "006",
            ObjectType::Lead => "00Q",
            ObjectType::Case => "500",
        }
    }

    /// Field holding the human-readable name, if the object has one
    pub fn name_field(&self) -> Option<&'static str> {
        match self {
            ObjectType::Account | ObjectType::Opportunity => Some(fields::NAME),
            ObjectType::Contact | ObjectType::Lead => Some(fields::LAST_NAME),
            ObjectType::Case => None,
        }
    }

    /// Resolve an object type from an id's key prefix
    pub fn from_key_prefix(prefix: &str) -> Option<ObjectType> {
        Self::ALL.into_iter().find(|t| t.key_prefix() == prefix)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}
