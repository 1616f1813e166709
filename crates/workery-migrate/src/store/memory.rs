//! In-memory document store.
//!
//! Keeps each collection as an insertion-ordered list. Filters match on
//! top-level field equality only, which is all the importers use. A
//! transaction snapshots every collection and restores it on abort.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};

use crate::error::{MigrateError, Result};

use super::DocumentStore;

type Collections = BTreeMap<String, Vec<Document>>;

#[derive(Default)]
struct Inner {
    collections: Collections,
    snapshot: Option<Collections>,
}

/// Document store that lives and dies with the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-write.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn filter_matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| match doc.get(key) {
        Some(actual) => values_equal(actual, expected),
        None => matches!(expected, Bson::Null),
    })
}

/// Integer widths compare by value, as they do in MongoDB.
fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Int32(x), Bson::Int64(y)) | (Bson::Int64(y), Bson::Int32(x)) => {
            i64::from(*x) == *y
        }
        _ => a == b,
    }
}

fn id_of(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()> {
        let mut inner = self.lock();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn replace_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<()> {
        let mut inner = self.lock();
        let slot = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| id_of(d) == Some(id)));
        match slot {
            Some(existing) => {
                *existing = doc;
                Ok(())
            }
            None => Err(MigrateError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_hex(),
            }),
        }
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<()> {
        let mut inner = self.lock();
        if let Some(docs) = inner.collections.get_mut(collection) {
            if let Some(pos) = docs.iter().position(|d| id_of(d) == Some(id)) {
                docs.remove(pos);
            }
        }
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let inner = self.lock();
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter_matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn start_transaction(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.snapshot.is_some() {
            return Err(MigrateError::Config(
                "a document store transaction is already open".to_string(),
            ));
        }
        let snapshot = inner.collections.clone();
        inner.snapshot = Some(snapshot);
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        self.lock().snapshot = None;
        Ok(())
    }

    async fn abort_transaction(&self) -> Result<()> {
        let mut inner = self.lock();
        if let Some(snapshot) = inner.snapshot.take() {
            inner.collections = snapshot;
        }
        Ok(())
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_find_filters_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        let tenant = ObjectId::new();
        for public_id in [3i64, 1, 2] {
            store
                .insert_one(
                    "tags",
                    doc! { "_id": ObjectId::new(), "tenant_id": tenant, "public_id": public_id },
                )
                .await
                .unwrap();
        }
        let other = doc! { "_id": ObjectId::new(), "tenant_id": ObjectId::new(), "public_id": 1i64 };
        store.insert_one("tags", other).await.unwrap();

        let docs = store.find("tags", doc! { "tenant_id": tenant }).await.unwrap();
        let ids: Vec<i64> = docs.iter().map(|d| d.get_i64("public_id").unwrap()).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let one = store
            .find_one("tags", doc! { "tenant_id": tenant, "public_id": 1i32 })
            .await
            .unwrap();
        assert!(one.is_some());
    }

    #[tokio::test]
    async fn test_replace_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .replace_one("tags", ObjectId::new(), Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::MissingDocument { .. }));
    }

    #[tokio::test]
    async fn test_abort_restores_snapshot() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        store.insert_one("tags", doc! { "_id": id }).await.unwrap();

        store.start_transaction().await.unwrap();
        store.delete_one("tags", id).await.unwrap();
        assert_eq!(store.count("tags"), 0);
        store.abort_transaction().await.unwrap();
        assert_eq!(store.count("tags"), 1);

        store.start_transaction().await.unwrap();
        store.delete_one("tags", id).await.unwrap();
        store.commit_transaction().await.unwrap();
        assert_eq!(store.count("tags"), 0);
    }
}
