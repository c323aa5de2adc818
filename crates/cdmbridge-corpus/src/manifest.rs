//! Draft and resolved manifests

use crate::document::{
    Definition, EntityDeclaration, EntityDefinition, EntityDocument, Import, ManifestDocument,
    TypeAttribute, SCHEMA_SEMANTIC_VERSION,
};
use crate::path::CorpusPath;

/// Suffix of manifest document names
pub const MANIFEST_SUFFIX: &str = ".manifest.cdm.json";

/// Unresolved manifest listing schema references by entity name
///
/// Adding an entity that is already present replaces its reference in
/// place, so each name appears once and keeps its first position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDraft {
    pub name: String,

    /// Folder the draft is registered in; `None` until registered
    pub folder: Option<CorpusPath>,

    pub imports: Vec<Import>,

    entities: Vec<(String, String)>,
}

impl ManifestDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder: None,
            imports: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Register the draft as a document in `folder`
    pub fn register_in(&mut self, folder: CorpusPath) {
        self.folder = Some(folder);
    }

    /// Add or replace the schema reference for an entity
    pub fn add_entity(&mut self, entity_name: impl Into<String>, schema_path: impl Into<String>) {
        let entity_name = entity_name.into();
        let schema_path = schema_path.into();

        match self.entities.iter_mut().find(|(name, _)| *name == entity_name) {
            Some(entry) => entry.1 = schema_path,
            None => self.entities.push((entity_name, schema_path)),
        }
    }

    /// `(entity name, schema path)` pairs in order
    pub fn entities(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entities.iter().map(|(n, p)| (n.as_str(), p.as_str()))
    }

    pub fn schema_path(&self, entity_name: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|(n, _)| n == entity_name)
            .map(|(_, p)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Options for draft resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Name of the resolved manifest
    pub manifest_name: String,

    /// Document name for resolved entities; `{n}` is the entity name
    pub entity_document_name_format: String,
}

impl ResolutionOptions {
    pub fn new(manifest_name: impl Into<String>) -> Self {
        Self {
            manifest_name: manifest_name.into(),
            ..Self::default()
        }
    }

    pub fn entity_document_name(&self, entity_name: &str) -> String {
        self.entity_document_name_format.replace("{n}", entity_name)
    }
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            manifest_name: "default".to_string(),
            entity_document_name_format: "{n}.cdm.json".to_string(),
        }
    }
}

/// Entity with its attributes flattened across the inheritance chain
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    pub entity_name: String,

    /// Absolute corpus path of the resolved definition
    pub path: CorpusPath,

    /// Schema reference it was resolved from
    pub source_path: String,

    pub attributes: Vec<TypeAttribute>,
}

impl ResolvedEntity {
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Document holding only this resolved definition
    pub fn to_document(&self) -> EntityDocument {
        EntityDocument::new(vec![Definition::Entity(EntityDefinition::new(
            self.entity_name.clone(),
            self.attributes.clone(),
        ))])
    }
}

/// Materialized manifest produced by resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestResolved {
    pub name: String,

    /// Folder the manifest and its resolved entity documents live in
    pub folder: CorpusPath,

    pub imports: Vec<Import>,

    pub entities: Vec<EntityDeclaration>,

    /// Resolved definitions, saved alongside the manifest
    pub resolved_entities: Vec<ResolvedEntity>,
}

impl ManifestResolved {
    /// Append an import; no duplicate check
    pub fn add_import(&mut self, corpus_path: impl Into<String>) {
        self.imports.push(Import::new(corpus_path));
    }

    /// Default document name: `<name>.manifest.cdm.json`
    pub fn document_name(&self) -> String {
        format!("{}{}", self.name, MANIFEST_SUFFIX)
    }

    pub fn find_declaration(&self, entity_name: &str) -> Option<&EntityDeclaration> {
        self.entities.iter().find(|e| e.entity_name == entity_name)
    }

    pub fn to_document(&self) -> ManifestDocument {
        ManifestDocument {
            json_schema_semantic_version: SCHEMA_SEMANTIC_VERSION.to_string(),
            manifest_name: self.name.clone(),
            imports: self.imports.clone(),
            entities: self.entities.clone(),
        }
    }
}
