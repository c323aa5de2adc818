//! Corpus over mounted storage adapters
//!
//! ## Resolution
//!
//! A schema reference `ns:/folder/doc.cdm.json/Name` is resolved by loading
//! the document and looking up the `Name` definition. When the document does
//! not define it, its imports are searched breadth-first. `extendsEntity`
//! chains are followed the same way and attributes are flattened base-first;
//! a derived attribute replaces a base attribute of the same name in place.
//!
//! A base entity that cannot be found ends the chain with a warning, matching
//! how partial standards trees are usually shipped. The entity itself must
//! exist.

use crate::corpus::{CorpusError, SchemaCorpus};
use crate::document::{EntityDefinition, EntityDeclaration, EntityDocument, TypeAttribute};
use crate::manifest::{ManifestDraft, ManifestResolved, ResolutionOptions, ResolvedEntity};
use crate::path::{CorpusPath, DOCUMENT_SUFFIX};
use crate::storage::{LocalAdapter, StorageAdapter, StorageError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Namespace for manifest and partition output
pub const LOCAL_NAMESPACE: &str = "local";

/// Namespace for shared schema definitions
pub const CDM_NAMESPACE: &str = "cdm";

type DocumentCache = HashMap<CorpusPath, Arc<EntityDocument>>;

/// Schema corpus backed by storage adapters
pub struct LocalCorpus {
    mounts: HashMap<String, Arc<dyn StorageAdapter>>,
    default_namespace: String,
}

impl LocalCorpus {
    /// Create a corpus with no mounts and `local` as default namespace
    pub fn new() -> Self {
        Self {
            mounts: HashMap::new(),
            default_namespace: LOCAL_NAMESPACE.to_string(),
        }
    }

    /// Mount a read-write `local` root and a read-only `cdm` root
    pub fn with_roots(local_root: impl AsRef<Path>, cdm_root: impl AsRef<Path>) -> Self {
        let mut corpus = Self::new();
        corpus.mount(LOCAL_NAMESPACE, Arc::new(LocalAdapter::new(local_root)));
        corpus.mount(CDM_NAMESPACE, Arc::new(LocalAdapter::new(cdm_root).read_only()));
        corpus
    }

    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = namespace.into();
    }

    /// Mounted namespaces in sorted order
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.mounts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn adapter(&self, namespace: &str) -> Result<&Arc<dyn StorageAdapter>, CorpusError> {
        self.mounts
            .get(namespace)
            .ok_or_else(|| CorpusError::UnknownNamespace(namespace.to_string()))
    }

    fn parse(&self, input: &str) -> Result<CorpusPath, CorpusError> {
        Ok(CorpusPath::parse(input, &self.default_namespace)?)
    }

    async fn load_document(
        &self,
        cache: &mut DocumentCache,
        path: &CorpusPath,
    ) -> Result<Arc<EntityDocument>, CorpusError> {
        if let Some(doc) = cache.get(path) {
            return Ok(Arc::clone(doc));
        }

        let adapter = self.adapter(&path.namespace)?;
        let text = adapter.read_text(&path.path).await.map_err(|e| match e {
            StorageError::FileNotFound(_) => CorpusError::DocumentNotFound(path.to_string()),
            other => CorpusError::Storage(other),
        })?;

        let doc: EntityDocument = serde_json::from_str(&text).map_err(|e| CorpusError::Parse {
            document: path.to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!(document = %path, definitions = doc.definitions.len(), "Loaded document");

        let doc = Arc::new(doc);
        cache.insert(path.clone(), Arc::clone(&doc));
        Ok(doc)
    }

    /// Find a definition in a document or, failing that, its imports
    async fn find_definition(
        &self,
        cache: &mut DocumentCache,
        document: &CorpusPath,
        name: &str,
    ) -> Result<(EntityDefinition, CorpusPath), CorpusError> {
        let mut queue = VecDeque::from([document.clone()]);
        let mut seen = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }

            let doc = match self.load_document(cache, &current).await {
                Ok(doc) => doc,
                Err(CorpusError::DocumentNotFound(_) | CorpusError::UnknownNamespace(_))
                    if current != *document =>
                {
                    tracing::warn!(import = %current, "Skipping unavailable import");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(def) = doc.entity(name) {
                return Ok((def.clone(), current));
            }

            let folder = current.folder();
            for import in &doc.imports {
                match CorpusPath::resolve(&import.corpus_path, &folder) {
                    Ok(path) => queue.push_back(path),
                    Err(error) => tracing::warn!(
                        document = %current,
                        import = %import.corpus_path,
                        %error,
                        "Skipping invalid import"
                    ),
                }
            }
        }

        Err(CorpusError::DefinitionNotFound {
            name: name.to_string(),
            document: document.to_string(),
        })
    }

    /// Resolve an entity reference into its name and flattened attributes
    async fn resolve_entity(
        &self,
        cache: &mut DocumentCache,
        reference: &CorpusPath,
    ) -> Result<(String, Vec<TypeAttribute>), CorpusError> {
        let (document, object) = reference.split_object();
        let name = object.unwrap_or_else(|| document.stem().to_string());

        let (entity, found_in) = self.find_definition(cache, &document, &name).await?;

        let mut visited = HashSet::from([(found_in.clone(), entity.entity_name.clone())]);
        let mut next = base_reference(&entity, &found_in)?;
        let mut chain = vec![entity];

        while let Some((base_doc, base_name)) = next.take() {
            let (base, base_found_in) = match self.find_definition(cache, &base_doc, &base_name).await {
                Ok(found) => found,
                Err(e @ (CorpusError::DefinitionNotFound { .. } | CorpusError::DocumentNotFound(_))) => {
                    tracing::warn!(
                        entity = %chain[0].entity_name,
                        base = %base_name,
                        error = %e,
                        "Base entity not found, attributes from it are omitted"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            if !visited.insert((base_found_in.clone(), base.entity_name.clone())) {
                return Err(CorpusError::Resolution(format!(
                    "Circular extendsEntity chain at '{}' in {}",
                    base.entity_name, base_found_in
                )));
            }

            next = base_reference(&base, &base_found_in)?;
            chain.push(base);
        }

        let mut attributes: Vec<TypeAttribute> = Vec::new();
        for def in chain.iter().rev() {
            for attr in def.type_attributes() {
                match attributes.iter_mut().find(|a| a.name == attr.name) {
                    Some(existing) => *existing = attr,
                    None => attributes.push(attr),
                }
            }
        }

        Ok((chain[0].entity_name.clone(), attributes))
    }
}

/// Where to look for the base of `entity`, which was found in `found_in`
fn base_reference(
    entity: &EntityDefinition,
    found_in: &CorpusPath,
) -> Result<Option<(CorpusPath, String)>, CorpusError> {
    let Some(base) = entity.base_entity() else {
        return Ok(None);
    };

    if base.contains(DOCUMENT_SUFFIX) {
        let path = CorpusPath::resolve(base, &found_in.folder())?;
        let (document, object) = path.split_object();
        let name = object.unwrap_or_else(|| document.stem().to_string());
        Ok(Some((document, name)))
    } else {
        Ok(Some((found_in.clone(), base.to_string())))
    }
}

impl Default for LocalCorpus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SchemaCorpus for LocalCorpus {
    fn mount(&mut self, namespace: &str, adapter: Arc<dyn StorageAdapter>) {
        tracing::debug!(namespace, read_only = adapter.is_read_only(), "Mounted storage");
        self.mounts.insert(namespace.to_string(), adapter);
    }

    fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    fn root_folder(&self, namespace: &str) -> Result<CorpusPath, CorpusError> {
        self.adapter(namespace)?;
        Ok(CorpusPath::root(namespace))
    }

    async fn resolve_manifest(
        &self,
        draft: &ManifestDraft,
        options: &ResolutionOptions,
    ) -> Result<ManifestResolved, CorpusError> {
        let folder = draft.folder.clone().ok_or_else(|| {
            CorpusError::Resolution(format!("Draft '{}' is not registered in a folder", draft.name))
        })?;
        self.adapter(&folder.namespace)?;

        let mut cache = DocumentCache::new();
        let mut entities = Vec::with_capacity(draft.len());
        let mut resolved_entities = Vec::with_capacity(draft.len());

        for (name, schema_path) in draft.entities() {
            let reference = CorpusPath::resolve(schema_path, &folder)?;
            let (entity_name, attributes) = self.resolve_entity(&mut cache, &reference).await?;

            let entity_path = format!("{}/{}", options.entity_document_name(&entity_name), entity_name);
            let path = CorpusPath::resolve(&entity_path, &folder)?;

            tracing::debug!(
                entity = name,
                reference = %reference,
                attributes = attributes.len(),
                "Resolved entity"
            );

            entities.push(EntityDeclaration::local(entity_name.clone(), entity_path));
            resolved_entities.push(ResolvedEntity {
                entity_name,
                path,
                source_path: schema_path.to_string(),
                attributes,
            });
        }

        Ok(ManifestResolved {
            name: options.manifest_name.clone(),
            folder,
            imports: draft.imports.clone(),
            entities,
            resolved_entities,
        })
    }

    async fn fetch_entity(
        &self,
        entity_path: &str,
        manifest: &ManifestResolved,
    ) -> Result<ResolvedEntity, CorpusError> {
        let path = CorpusPath::resolve(entity_path, &manifest.folder)?;

        if let Some(entity) = manifest.resolved_entities.iter().find(|e| e.path == path) {
            return Ok(entity.clone());
        }

        let mut cache = DocumentCache::new();
        let (entity_name, attributes) = self.resolve_entity(&mut cache, &path).await?;

        Ok(ResolvedEntity {
            entity_name,
            path,
            source_path: entity_path.to_string(),
            attributes,
        })
    }

    fn create_relative_corpus_path(
        &self,
        path: &str,
        manifest: &ManifestResolved,
    ) -> Result<String, CorpusError> {
        Ok(self.parse(path)?.relative_to(&manifest.folder))
    }

    fn corpus_path_to_adapter_path(&self, path: &str) -> Result<PathBuf, CorpusError> {
        let path = self.parse(path)?;
        Ok(self.adapter(&path.namespace)?.adapter_path(&path.path)?)
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<(), CorpusError> {
        let path = self.parse(path)?;
        let adapter = self.adapter(&path.namespace)?;

        if adapter.is_read_only() {
            return Err(CorpusError::ReadOnly(path.namespace));
        }

        adapter.write_text(&path.path, content).await?;
        Ok(())
    }

    async fn save_manifest(
        &self,
        manifest: &ManifestResolved,
        document_name: &str,
        overwrite: bool,
    ) -> Result<CorpusPath, CorpusError> {
        let target = manifest.folder.join(document_name)?;
        let adapter = self.adapter(&target.namespace)?;

        if adapter.is_read_only() {
            return Err(CorpusError::ReadOnly(target.namespace));
        }
        if !overwrite && adapter.exists(&target.path).await? {
            return Err(CorpusError::AlreadyExists(target.to_string()));
        }

        for entity in &manifest.resolved_entities {
            let (document, _) = entity.path.split_object();
            let json = to_json(&entity.to_document(), &document)?;
            self.write_text(&document.to_string(), &json).await?;
        }

        let json = to_json(&manifest.to_document(), &target)?;
        adapter.write_text(&target.path, &json).await?;

        tracing::info!(manifest = %target, entities = manifest.entities.len(), "Saved manifest");
        Ok(target)
    }
}

fn to_json<T: serde::Serialize>(value: &T, document: &CorpusPath) -> Result<String, CorpusError> {
    serde_json::to_string_pretty(value).map_err(|e| CorpusError::Serialize {
        document: document.to_string(),
        message: e.to_string(),
    })
}
