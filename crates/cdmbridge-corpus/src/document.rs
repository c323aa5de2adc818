//! Schema document model (`*.cdm.json`)
//!
//! Covers the subset of the document format the corpus reads and writes:
//! entity documents with their definitions, and manifest documents with
//! entity declarations and data partitions. Unknown definition and attribute
//! shapes are kept as raw JSON so they survive a read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document format version written by this crate
pub const SCHEMA_SEMANTIC_VERSION: &str = "1.0.0";

/// Trait naming the CSV partition format
pub const CSV_FORMAT_TRAIT: &str = "is.partition.format.CSV";

fn default_version() -> String {
    SCHEMA_SEMANTIC_VERSION.to_string()
}

/// Reference to another document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Import {
    pub corpus_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moniker: Option<String>,
}

impl Import {
    pub fn new(corpus_path: impl Into<String>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            moniker: None,
        }
    }
}

/// Entity schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDocument {
    #[serde(default = "default_version")]
    pub json_schema_semantic_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,

    #[serde(default)]
    pub definitions: Vec<Definition>,
}

impl EntityDocument {
    pub fn new(definitions: Vec<Definition>) -> Self {
        Self {
            json_schema_semantic_version: default_version(),
            imports: Vec::new(),
            definitions,
        }
    }

    /// Find an entity definition by name
    pub fn entity(&self, name: &str) -> Option<&EntityDefinition> {
        self.entities().find(|e| e.entity_name == name)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Entity(entity) => Some(entity),
            Definition::Other(_) => None,
        })
    }
}

/// A top-level definition in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Definition {
    Entity(EntityDefinition),

    /// Trait, purpose, data type or attribute group definitions
    Other(Value),
}

/// Entity definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub entity_name: String,

    /// Base entity, either a name/path string or an `entityReference` object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends_entity: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub has_attributes: Vec<AttributeEntry>,
}

impl EntityDefinition {
    pub fn new(entity_name: impl Into<String>, attributes: Vec<TypeAttribute>) -> Self {
        Self {
            entity_name: entity_name.into(),
            extends_entity: None,
            description: None,
            has_attributes: attributes.into_iter().map(AttributeEntry::Type).collect(),
        }
    }

    /// Name or path of the base entity, if any
    pub fn base_entity(&self) -> Option<&str> {
        match self.extends_entity.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Object(obj) => match obj.get("entityReference")? {
                Value::String(name) => Some(name.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Named attributes of this entity, in order, in their resolved shape
    ///
    /// Inline attribute groups (`attributeGroupReference` objects with
    /// `members`) are expanded in place; groups referenced by name are
    /// skipped. Entity attributes resolve by reference: each becomes a single
    /// foreign key attribute carrying the relationship's name.
    pub fn type_attributes(&self) -> Vec<TypeAttribute> {
        let mut out = Vec::new();
        for entry in &self.has_attributes {
            match entry {
                AttributeEntry::Type(attr) => out.push(attr.resolved()),
                AttributeEntry::Other(value) => collect_group_members(value, &mut out),
            }
        }
        out
    }
}

fn collect_group_members(value: &Value, out: &mut Vec<TypeAttribute>) {
    let Some(members) = value
        .get("attributeGroupReference")
        .and_then(|group| group.get("members"))
        .and_then(Value::as_array)
    else {
        return;
    };

    for member in members {
        if member.get("attributeGroupReference").is_some() {
            collect_group_members(member, out);
        } else if let Ok(attr) = serde_json::from_value::<TypeAttribute>(member.clone()) {
            out.push(attr.resolved());
        }
    }
}

/// An entry in `hasAttributes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeEntry {
    Type(TypeAttribute),

    /// Attribute group references and other shapes
    Other(Value),
}

/// Named attribute with its remaining properties kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAttribute {
    pub name: String,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl TypeAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
        }
    }

    pub fn with_data_format(mut self, data_format: &str) -> Self {
        self.properties
            .insert("dataFormat".to_string(), Value::String(data_format.to_string()));
        self
    }

    /// Entity attributes (relationships) carry an `entity` property
    pub fn is_entity_attribute(&self) -> bool {
        self.properties.contains_key("entity")
    }

    /// Shape after resolution
    ///
    /// An entity attribute becomes its foreign key: same name, without the
    /// `entity` reference and its `resolutionGuidance`. Type attributes are
    /// returned unchanged.
    pub fn resolved(&self) -> TypeAttribute {
        let mut attr = self.clone();
        if attr.is_entity_attribute() {
            attr.properties.remove("entity");
            attr.properties.remove("resolutionGuidance");
        }
        attr
    }
}

/// Argument of a trait reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitArgument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub value: String,
}

/// Trait applied to an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitReference {
    pub trait_reference: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<TraitArgument>,
}

impl TraitReference {
    pub fn new(trait_reference: impl Into<String>) -> Self {
        Self {
            trait_reference: trait_reference.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push(TraitArgument {
            name: Some(name.into()),
            value: value.into(),
        });
        self
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| a.value.as_str())
    }

    /// CSV format trait with header row and delimiter
    pub fn csv_format(column_headers: bool, delimiter: &str) -> Self {
        Self::new(CSV_FORMAT_TRAIT)
            .with_argument("columnHeaders", column_headers.to_string())
            .with_argument("delimiter", delimiter)
    }
}

/// Pointer to a physical data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPartition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exhibits_traits: Vec<TraitReference>,
}

impl DataPartition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            location: String::new(),
            explanation: None,
            exhibits_traits: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn exhibit(mut self, trait_ref: TraitReference) -> Self {
        self.exhibits_traits.push(trait_ref);
        self
    }

    pub fn find_trait(&self, name: &str) -> Option<&TraitReference> {
        self.exhibits_traits.iter().find(|t| t.trait_reference == name)
    }
}

/// Entity declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDeclaration {
    #[serde(rename = "type")]
    pub declaration_type: String,

    pub entity_name: String,

    /// Path to the entity definition, relative to the manifest folder
    pub entity_path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_partitions: Vec<DataPartition>,
}

impl EntityDeclaration {
    pub fn local(entity_name: impl Into<String>, entity_path: impl Into<String>) -> Self {
        Self {
            declaration_type: "LocalEntity".to_string(),
            entity_name: entity_name.into(),
            entity_path: entity_path.into(),
            data_partitions: Vec::new(),
        }
    }
}

/// Manifest document (`<name>.manifest.cdm.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    #[serde(default = "default_version")]
    pub json_schema_semantic_version: String,

    pub manifest_name: String,

    #[serde(default)]
    pub imports: Vec<Import>,

    #[serde(default)]
    pub entities: Vec<EntityDeclaration>,
}

impl ManifestDocument {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
