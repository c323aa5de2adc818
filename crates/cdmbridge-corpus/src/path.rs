//! Corpus paths
//!
//! A corpus path addresses a document, or an object inside a document, within
//! a mounted storage root: `cdm:/core/account.cdm.json/account`. The part
//! before `:/` is the namespace; paths without one belong to the default
//! namespace or are relative to a containing folder.

use std::fmt;

/// Suffix that marks a schema document segment
pub const DOCUMENT_SUFFIX: &str = ".cdm.json";

/// A namespaced absolute corpus path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorpusPath {
    /// Storage namespace (e.g. "local", "cdm")
    pub namespace: String,

    /// Absolute path inside the namespace, always starting with '/'
    pub path: String,
}

impl CorpusPath {
    pub fn new(namespace: impl Into<String>, path: &str) -> Result<Self, PathError> {
        let path = normalize(path)?;
        Ok(Self {
            namespace: namespace.into(),
            path,
        })
    }

    /// Parse `ns:/path`, falling back to `default_namespace` when no namespace is given
    pub fn parse(input: &str, default_namespace: &str) -> Result<Self, PathError> {
        match split_namespace(input) {
            (Some(ns), rest) => Self::new(ns, rest),
            (None, rest) => Self::new(default_namespace, rest),
        }
    }

    /// Resolve `input` against a folder; absolute or namespaced input is taken as-is
    pub fn resolve(input: &str, folder: &CorpusPath) -> Result<Self, PathError> {
        match split_namespace(input) {
            (Some(ns), rest) => Self::new(ns, rest),
            (None, rest) if rest.starts_with('/') => Self::new(folder.namespace.clone(), rest),
            (None, rest) => {
                let base = folder.path.trim_end_matches('/');
                Self::new(folder.namespace.clone(), &format!("{}/{}", base, rest))
            }
        }
    }

    /// Root folder of a namespace
    pub fn root(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: "/".to_string(),
        }
    }

    /// Split into the document path and the object name inside it
    ///
    /// `/core/account.cdm.json/account` yields `("/core/account.cdm.json", Some("account"))`.
    pub fn split_object(&self) -> (CorpusPath, Option<String>) {
        if let Some(idx) = self.path.find(DOCUMENT_SUFFIX) {
            let end = idx + DOCUMENT_SUFFIX.len();
            let doc = CorpusPath {
                namespace: self.namespace.clone(),
                path: self.path[..end].to_string(),
            };
            let object = self.path[end..].trim_matches('/');
            let object = (!object.is_empty()).then(|| object.to_string());
            (doc, object)
        } else {
            (self.clone(), None)
        }
    }

    /// Folder containing this path (with trailing '/')
    pub fn folder(&self) -> CorpusPath {
        let (doc, _) = self.split_object();
        let folder = match doc.path.rfind('/') {
            Some(idx) => &doc.path[..=idx],
            None => "/",
        };
        CorpusPath {
            namespace: self.namespace.clone(),
            path: folder.to_string(),
        }
    }

    /// Last path segment without the document suffix
    pub fn stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or_default();
        name.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(name)
    }

    /// Append a segment
    pub fn join(&self, segment: &str) -> Result<CorpusPath, PathError> {
        CorpusPath::resolve(segment.trim_start_matches('/'), &self.as_folder())
    }

    fn as_folder(&self) -> CorpusPath {
        let mut path = self.path.clone();
        if !path.ends_with('/') {
            path.push('/');
        }
        CorpusPath {
            namespace: self.namespace.clone(),
            path,
        }
    }

    /// Express this path relative to `folder` when it lies inside it
    pub fn relative_to(&self, folder: &CorpusPath) -> String {
        let folder = folder.as_folder();
        if self.namespace == folder.namespace {
            if let Some(rest) = self.path.strip_prefix(&folder.path) {
                if !rest.is_empty() {
                    return rest.to_string();
                }
            }
        }
        self.to_string()
    }
}

impl fmt::Display for CorpusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Split `ns:/rest` into its namespace and remainder
pub fn split_namespace(input: &str) -> (Option<&str>, &str) {
    match input.find(":/") {
        Some(idx) if idx > 0 && !input[..idx].contains('/') => (Some(&input[..idx]), &input[idx + 1..]),
        _ => (None, input),
    }
}

/// Collapse `.`, `..` and empty segments; climbing above `/` is an error
fn normalize(path: &str) -> Result<String, PathError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathError::Traversal(path.to_string()));
                }
            }
            s => segments.push(s),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') && normalized.len() > 1 {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Corpus path errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Path climbs above the namespace root: {0}")]
    Traversal(String),
}
