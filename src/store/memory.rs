use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::store::path::{CollectionPath, DocPath, Document};
use crate::store::traits::{AtomicStore, DocumentStore, QueryStore};

type Collection = BTreeMap<String, Value>;

/// In-process document store for local runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionPath, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.collections.read().values().map(BTreeMap::len).sum()
    }
}

fn to_documents(collection: &Collection) -> Vec<Document> {
    collection
        .iter()
        .map(|(id, data)| Document::new(id.clone(), data.clone()))
        .collect()
}

fn merge_fields(target: &mut Value, fields: Map<String, Value>) {
    match target {
        Value::Object(existing) => existing.extend(fields),
        other => *other = Value::Object(fields),
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(path.collection())
            .and_then(|collection| collection.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<()> {
        let mut collections = self.collections.write();
        collections
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().to_string(), data);
        Ok(())
    }

    async fn merge(&self, path: &DocPath, fields: Map<String, Value>) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(existing) = collections
            .get_mut(path.collection())
            .and_then(|collection| collection.get_mut(path.id()))
        else {
            return Ok(false);
        };
        merge_fields(existing, fields);
        Ok(true)
    }

    async fn delete(&self, path: &DocPath) -> Result<bool> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(path.collection())
            .and_then(|collection| collection.remove(path.id()))
            .is_some())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        Ok(collections.get(collection).map(to_documents).unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl QueryStore for MemoryStore {
    async fn collection_group(&self, name: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let mut paths: Vec<&CollectionPath> = collections
            .keys()
            .filter(|path| path.is_in_group(name))
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .filter_map(|path| collections.get(path))
            .flat_map(to_documents)
            .collect())
    }
}

#[async_trait::async_trait]
impl AtomicStore for MemoryStore {
    async fn modify<T, F>(&self, path: &DocPath, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(Option<Value>) -> Result<(Option<Value>, T)> + Send,
    {
        let mut collections = self.collections.write();
        let current = collections
            .get(path.collection())
            .and_then(|collection| collection.get(path.id()))
            .cloned();

        let (next, result) = f(current)?;

        match next {
            Some(value) => {
                collections
                    .entry(path.collection().clone())
                    .or_default()
                    .insert(path.id().to_string(), value);
            }
            None => {
                if let Some(collection) = collections.get_mut(path.collection()) {
                    collection.remove(path.id());
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::path::collection;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        let path = collection("users").doc("u1");

        assert_eq!(store.get(&path).await.unwrap(), None);
        store.set(&path, json!({"name": "Asha"})).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"name": "Asha"})));

        assert!(store.delete(&path).await.unwrap());
        assert!(!store.delete(&path).await.unwrap());
        assert_eq!(store.document_count(), 0);
    }

    #[tokio::test]
    async fn test_merge_requires_existing_document() {
        let store = MemoryStore::new();
        let path = collection("orders").doc("o1");

        let mut fields = Map::new();
        fields.insert("status".to_string(), json!("Shipped"));
        assert!(!store.merge(&path, fields.clone()).await.unwrap());
        assert_eq!(store.get(&path).await.unwrap(), None);

        store.set(&path, json!({"status": "Pending", "product": "Rice"})).await.unwrap();
        assert!(store.merge(&path, fields).await.unwrap());
        assert_eq!(
            store.get(&path).await.unwrap(),
            Some(json!({"status": "Shipped", "product": "Rice"}))
        );
    }

    #[tokio::test]
    async fn test_added_documents_list_in_creation_order() {
        let store = MemoryStore::new();
        let messages = collection("chats").doc("c1").sub("messages");

        for n in 0..20 {
            store.add(&messages, json!({"n": n})).await.unwrap();
        }

        let listed: Vec<i64> = store
            .list(&messages)
            .await
            .unwrap()
            .iter()
            .map(|doc| doc.data["n"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_field_queries() {
        let store = MemoryStore::new();
        let chats = collection("chats");
        store.set(&chats.doc("a"), json!({"participants": ["u1", "u2"], "kind": "dm"})).await.unwrap();
        store.set(&chats.doc("b"), json!({"participants": ["u2", "u3"], "kind": "group"})).await.unwrap();

        let with_u1 = store.find_containing(&chats, "participants", &json!("u1")).await.unwrap();
        assert_eq!(with_u1.len(), 1);
        assert_eq!(with_u1[0].id, "a");

        let groups = store.find_by_field(&chats, "kind", &json!("group")).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "b");
    }

    #[tokio::test]
    async fn test_collection_group_spans_parents() {
        let store = MemoryStore::new();
        let sensors = collection("sensors_data");
        store.add(&sensors.doc("s1").sub("readings"), json!({"t": 1})).await.unwrap();
        store.add(&sensors.doc("s2").sub("readings"), json!({"t": 2})).await.unwrap();
        store.set(&sensors.doc("s1").sub("config").doc("thresholds"), json!({})).await.unwrap();

        let readings = store.collection_group("readings").await.unwrap();
        assert_eq!(readings.len(), 2);
    }

    #[tokio::test]
    async fn test_modify_error_leaves_document_untouched() {
        let store = MemoryStore::new();
        let path = collection("carts").doc("u1");
        store.set(&path, json!({"items": []})).await.unwrap();

        let result: Result<()> = store
            .modify(&path, |_| Err(anyhow::anyhow!("rejected")))
            .await;
        assert!(result.is_err());
        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"items": []})));

        let removed = store.modify(&path, |current| Ok((None, current.is_some()))).await.unwrap();
        assert!(removed);
        assert_eq!(store.get(&path).await.unwrap(), None);
    }
}
