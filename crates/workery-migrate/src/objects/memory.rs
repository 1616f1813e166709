//! In-memory object store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{MigrateError, Result};

use super::ObjectStore;

/// Bucket held in a sorted map; listing is in key order like S3.
pub struct MemoryObjectStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
        }
    }

    /// Seed an object without going through the trait.
    pub fn with_object(self, key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.lock().insert(key.into(), body.into());
        self
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| MigrateError::object_store(key, "no such key"))
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.lock().insert(key.to_string(), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_list() {
        let store = MemoryObjectStore::new("legacy").with_object("media/b.pdf", b"b".to_vec());
        store.put("media/a.pdf", b"a".to_vec()).await.unwrap();

        assert_eq!(
            store.list_keys().await.unwrap(),
            vec!["media/a.pdf".to_string(), "media/b.pdf".to_string()]
        );
        assert_eq!(store.get("media/a.pdf").await.unwrap(), b"a".to_vec());
        assert!(store.get("media/missing.pdf").await.is_err());
        assert_eq!(store.bucket(), "legacy");
    }
}
