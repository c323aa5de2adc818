//! Entity metadata as returned by a metadata source

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Attribute type codes reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    Boolean,
    Customer,
    DateTime,
    Decimal,
    Double,
    Integer,
    Lookup,
    Memo,
    Money,
    Owner,
    PartyList,
    Picklist,
    State,
    Status,
    String,
    Uniqueidentifier,
    CalendarRules,
    Virtual,
    BigInt,
    ManagedProperty,
    EntityName,

    /// A type code this crate does not know about
    Other(std::string::String),
}

impl AttributeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "Boolean",
            Self::Customer => "Customer",
            Self::DateTime => "DateTime",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Integer => "Integer",
            Self::Lookup => "Lookup",
            Self::Memo => "Memo",
            Self::Money => "Money",
            Self::Owner => "Owner",
            Self::PartyList => "PartyList",
            Self::Picklist => "Picklist",
            Self::State => "State",
            Self::Status => "Status",
            Self::String => "String",
            Self::Uniqueidentifier => "Uniqueidentifier",
            Self::CalendarRules => "CalendarRules",
            Self::Virtual => "Virtual",
            Self::BigInt => "BigInt",
            Self::ManagedProperty => "ManagedProperty",
            Self::EntityName => "EntityName",
            Self::Other(name) => name,
        }
    }

    /// Parse a type code, case-insensitively
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "customer" => Self::Customer,
            "datetime" => Self::DateTime,
            "decimal" => Self::Decimal,
            "double" => Self::Double,
            "integer" => Self::Integer,
            "lookup" => Self::Lookup,
            "memo" => Self::Memo,
            "money" => Self::Money,
            "owner" => Self::Owner,
            "partylist" => Self::PartyList,
            "picklist" => Self::Picklist,
            "state" => Self::State,
            "status" => Self::Status,
            "string" => Self::String,
            "uniqueidentifier" => Self::Uniqueidentifier,
            "calendarrules" => Self::CalendarRules,
            "virtual" => Self::Virtual,
            "bigint" => Self::BigInt,
            "managedproperty" => Self::ManagedProperty,
            "entityname" => Self::EntityName,
            _ => Self::Other(code.to_string()),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::string::String> for AttributeType {
    fn from(code: std::string::String) -> Self {
        Self::from_code(&code)
    }
}

impl From<AttributeType> for std::string::String {
    fn from(value: AttributeType) -> Self {
        value.as_str().to_string()
    }
}

/// A single attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeMetadata {
    pub logical_name: String,

    /// Declared type; absent for some system attributes
    #[serde(default)]
    pub attribute_type: Option<AttributeType>,
}

impl AttributeMetadata {
    pub fn new(logical_name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            logical_name: logical_name.into(),
            attribute_type: Some(attribute_type),
        }
    }

    /// Type tag as text; an absent type renders as the empty string
    pub fn type_name(&self) -> String {
        self.attribute_type
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// An entity definition with its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityMetadata {
    pub logical_name: String,

    #[serde(default)]
    pub attributes: Vec<AttributeMetadata>,
}

impl EntityMetadata {
    pub fn new(logical_name: impl Into<String>, attributes: Vec<AttributeMetadata>) -> Self {
        Self {
            logical_name: logical_name.into(),
            attributes,
        }
    }
}

/// Which parts of an entity definition to retrieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityFilters(u8);

impl EntityFilters {
    pub const ENTITY: Self = Self(1);
    pub const ATTRIBUTES: Self = Self(2);
    pub const PRIVILEGES: Self = Self(4);
    pub const RELATIONSHIPS: Self = Self(8);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EntityFilters {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A metadata enumeration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataQuery {
    pub filters: EntityFilters,

    /// Return current (unpublished) definitions rather than the published ones
    pub retrieve_as_if_published: bool,
}

impl MetadataQuery {
    /// All entities with their attributes, as if published
    pub fn entities_with_attributes() -> Self {
        Self {
            filters: EntityFilters::ENTITY | EntityFilters::ATTRIBUTES,
            retrieve_as_if_published: true,
        }
    }

    pub fn includes_attributes(&self) -> bool {
        self.filters.contains(EntityFilters::ATTRIBUTES)
    }
}

impl Default for MetadataQuery {
    fn default() -> Self {
        Self::entities_with_attributes()
    }
}
