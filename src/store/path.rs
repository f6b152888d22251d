use std::fmt;

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

/// Path of a collection: an odd number of `/`-separated segments
/// (`inventory`, `forum_threads/t1/comments`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

/// A collection path plus a document id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    collection: CollectionPath,
    id: String,
}

impl CollectionPath {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            bail!("Empty segment in collection path '{}'", path);
        }
        if segments.len() % 2 == 0 {
            bail!("'{}' names a document, not a collection", path);
        }
        Ok(Self(path.to_string()))
    }

    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        DocPath {
            collection: self.clone(),
            id: id.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment, used for collection-group matching
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn is_in_group(&self, name: &str) -> bool {
        self.name() == name
    }
}

impl DocPath {
    pub fn parse(path: &str) -> Result<Self> {
        let Some((collection, id)) = path.rsplit_once('/') else {
            bail!("'{}' names a collection, not a document", path);
        };
        if id.is_empty() {
            bail!("Empty document id in '{}'", path);
        }
        Ok(CollectionPath::parse(collection)?.doc(id))
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Nested collection below this document
    pub fn sub(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}/{}", self.collection.0, self.id, name))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Shorthand for a top-level collection
pub fn collection(name: &str) -> CollectionPath {
    CollectionPath::new(name)
}

/// A stored document with its id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self { id: id.into(), data }
    }

    /// Top-level field lookup
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}
