use anyhow::Result;
use serde_json::{Map, Value};

use crate::model::{generate_push_id, Id};
use crate::store::path::{CollectionPath, DocPath, Document};

/// Basic document CRUD over slash-separated paths
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>>;
    /// Create or replace a document
    async fn set(&self, path: &DocPath, data: Value) -> Result<()>;
    /// Shallow-merge top-level fields into an existing document.
    /// Returns false (and writes nothing) when the document does not exist.
    async fn merge(&self, path: &DocPath, fields: Map<String, Value>) -> Result<bool>;
    async fn delete(&self, path: &DocPath) -> Result<bool>;
    /// All documents of one collection, ordered by id
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>>;

    /// Store under a fresh push id and return the id
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<Id> {
        let id = generate_push_id();
        self.set(&collection.doc(id.clone()), data).await?;
        Ok(id)
    }
}

/// Field queries the handlers need beyond plain listing
#[async_trait::async_trait]
pub trait QueryStore: DocumentStore {
    /// Documents whose top-level `field` equals `value`
    async fn find_by_field(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let documents = self.list(collection).await?;
        Ok(documents
            .into_iter()
            .filter(|doc| doc.field(field) == Some(value))
            .collect())
    }

    /// Documents whose top-level array `field` contains `value`
    async fn find_containing(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let documents = self.list(collection).await?;
        Ok(documents
            .into_iter()
            .filter(|doc| {
                doc.field(field)
                    .and_then(Value::as_array)
                    .map_or(false, |values| values.contains(value))
            })
            .collect())
    }

    /// Every document in any collection whose last segment is `name`
    async fn collection_group(&self, name: &str) -> Result<Vec<Document>>;
}

/// Atomic read-modify-write of a single document
#[async_trait::async_trait]
pub trait AtomicStore: Send + Sync {
    /// `f` receives the current value and returns the new value (`None`
    /// deletes) together with a result. Errors returned by `f` abort the
    /// write and are passed through unchanged.
    async fn modify<T, F>(&self, path: &DocPath, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T)> + Send;
}

pub trait Store: DocumentStore + QueryStore + AtomicStore + Send + Sync {}

impl<T> Store for T where T: DocumentStore + QueryStore + AtomicStore + Send + Sync {}
