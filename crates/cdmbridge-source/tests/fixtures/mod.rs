//! Test fixtures for metadata source integration tests
//!
//! Entity definitions resembling a small CRM solution, plus the matching
//! saved web API response body.

#![allow(dead_code)]

use cdmbridge_source::{AttributeMetadata, AttributeType, EntityMetadata};

/// Account entity
///
/// - Primary key (accountid)
/// - Name and financials
/// - Owner lookup
pub fn account_entity() -> EntityMetadata {
    EntityMetadata::new(
        "account",
        vec![
            AttributeMetadata::new("accountid", AttributeType::Uniqueidentifier),
            AttributeMetadata::new("name", AttributeType::String),
            AttributeMetadata::new("revenue", AttributeType::Money),
            AttributeMetadata::new("ownerid", AttributeType::Owner),
        ],
    )
}

/// Contact entity
pub fn contact_entity() -> EntityMetadata {
    EntityMetadata::new(
        "contact",
        vec![
            AttributeMetadata::new("contactid", AttributeType::Uniqueidentifier),
            AttributeMetadata::new("lastname", AttributeType::String),
            AttributeMetadata::new("birthdate", AttributeType::DateTime),
            AttributeMetadata::new("parentcustomerid", AttributeType::Customer),
        ],
    )
}

/// Entity with no attributes
pub fn empty_entity() -> EntityMetadata {
    EntityMetadata::new("activityparty", Vec::new())
}

/// Saved response body for account and contact
pub fn saved_response() -> &'static str {
    r#"{
  "@odata.context": "https://org.crm4.dynamics.com/api/data/v9.2/$metadata#EntityDefinitions(LogicalName,Attributes(LogicalName,AttributeType))",
  "value": [
    {
      "LogicalName": "account",
      "Attributes": [
        { "LogicalName": "accountid", "AttributeType": "Uniqueidentifier" },
        { "LogicalName": "name", "AttributeType": "String" },
        { "LogicalName": "revenue", "AttributeType": "Money" },
        { "LogicalName": "ownerid", "AttributeType": "Owner" }
      ]
    },
    {
      "LogicalName": "contact",
      "Attributes": [
        { "LogicalName": "contactid", "AttributeType": "Uniqueidentifier" },
        { "LogicalName": "lastname", "AttributeType": "String" },
        { "LogicalName": "birthdate", "AttributeType": "DateTime" },
        { "LogicalName": "parentcustomerid", "AttributeType": "Customer" }
      ]
    }
  ]
}"#
}
