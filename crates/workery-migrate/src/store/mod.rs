//! Document store access.
//!
//! [`DocumentStore`] is the untyped seam the MongoDB backend and the
//! in-memory backend implement. [`Repository`] adds per-entity typing on top.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::marker::PhantomData;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::error::{MigrateError, Result};
use crate::model::Entity;

/// Untyped operations on named collections.
///
/// While a transaction is open every operation joins it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()>;

    /// Replace the document with `_id == id`. Replacing a missing document
    /// is an error.
    async fn replace_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<()>;

    /// Delete the document with `_id == id`, if present.
    async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<()>;

    /// First document (in `_id` order) whose top-level fields equal the filter's.
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Every matching document in `_id` order.
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>>;

    async fn start_transaction(&self) -> Result<()>;

    async fn commit_transaction(&self) -> Result<()>;

    async fn abort_transaction(&self) -> Result<()>;

    /// Backend name for logging.
    fn db_type(&self) -> &str;
}

/// Typed view over one entity collection.
pub struct Repository<'a, T> {
    store: &'a dyn DocumentStore,
    _entity: PhantomData<T>,
}

impl<'a, T: Entity> Repository<'a, T> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn insert(&self, entity: &T) -> Result<()> {
        let doc = bson::to_document(entity)?;
        self.store.insert_one(T::COLLECTION, doc).await
    }

    pub async fn replace(&self, entity: &T) -> Result<()> {
        let doc = bson::to_document(entity)?;
        self.store
            .replace_one(T::COLLECTION, entity.id(), doc)
            .await
    }

    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        self.store.delete_one(T::COLLECTION, id).await
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<T>> {
        self.find_one(doc! { "_id": id }).await
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        match self.store.find_one(T::COLLECTION, filter).await? {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find(&self, filter: Document) -> Result<Vec<T>> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|doc| bson::from_document(doc).map_err(MigrateError::from))
            .collect()
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        self.find(Document::new()).await
    }
}
