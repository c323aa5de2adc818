//! Test fixtures for corpus integration tests
//!
//! A trimmed standards tree: a foundations document, a shared base entity
//! and two accelerator entities that import it.

#![allow(dead_code)]

use std::path::Path;

pub const ACCELERATOR_FOLDER: &str = "core/accelerators/healthCare";

pub fn foundations() -> &'static str {
    r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "definitions": [
    { "traitName": "is.partition.format.CSV" },
    { "dataTypeName": "string" }
  ]
}"#
}

/// Base entity with inline attribute group
pub fn cdm_entity() -> &'static str {
    r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "imports": [ { "corpusPath": "/foundations.cdm.json" } ],
  "definitions": [
    {
      "entityName": "CdmEntity",
      "hasAttributes": [
        {
          "attributeGroupReference": {
            "attributeGroupName": "attributesAddedAtThisScope",
            "members": [
              { "name": "createdOn", "dataFormat": "DateTime" },
              { "name": "modifiedOn", "dataFormat": "DateTime" }
            ]
          }
        }
      ]
    }
  ]
}"#
}

/// Account extends CdmEntity through an import
pub fn account() -> &'static str {
    r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "imports": [ { "corpusPath": "/core/CdmEntity.cdm.json" } ],
  "definitions": [
    {
      "entityName": "account",
      "extendsEntity": "CdmEntity",
      "hasAttributes": [
        { "name": "accountid", "dataFormat": "Guid" },
        { "name": "name", "dataFormat": "String" },
        { "name": "primarycontactid", "entity": { "entityReference": "contact" } }
      ]
    }
  ]
}"#
}

/// Contact extends CdmEntity by document path
pub fn contact() -> &'static str {
    r#"{
  "jsonSchemaSemanticVersion": "1.0.0",
  "definitions": [
    {
      "entityName": "contact",
      "extendsEntity": { "entityReference": "/core/CdmEntity.cdm.json/CdmEntity" },
      "hasAttributes": [
        { "name": "contactid", "dataFormat": "Guid" },
        { "name": "modifiedOn", "dataFormat": "DateTimeOffset" }
      ]
    }
  ]
}"#
}

/// Write the standards tree below `root`
pub fn write_standards(root: &Path) {
    let write = |relative: &str, content: &str| {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    };

    write("foundations.cdm.json", foundations());
    write("core/CdmEntity.cdm.json", cdm_entity());
    write(&format!("{}/account.cdm.json", ACCELERATOR_FOLDER), account());
    write(&format!("{}/contact.cdm.json", ACCELERATOR_FOLDER), contact());
}

/// Schema reference for an accelerator entity
pub fn schema_path(entity: &str) -> String {
    format!("cdm:/{}/{}.cdm.json/{}", ACCELERATOR_FOLDER, entity, entity)
}
