//! Lookups of already-migrated documents.
//!
//! A missing document is `Ok(None)` here; callers decide whether that is
//! fatal. Store failures are still errors.

use std::collections::HashMap;
use std::sync::Mutex;

use bson::oid::ObjectId;
use bson::{doc, Document};
use tracing::debug;

use crate::error::Result;
use crate::model::{Entity, Tenant};
use crate::store::{DocumentStore, Repository};

pub struct Resolver<'a> {
    store: &'a dyn DocumentStore,
    tenant_id: Option<ObjectId>,
    /// `(collection, public_id) -> _id` for kinds marked `CACHED`.
    cache: Mutex<HashMap<(&'static str, i64), ObjectId>>,
}

impl<'a> Resolver<'a> {
    /// Resolver for tenant-independent lookups (tenants themselves).
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            tenant_id: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolver restricting tenant-owned kinds to one tenant.
    pub fn for_tenant(store: &'a dyn DocumentStore, tenant_id: ObjectId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ..Self::new(store)
        }
    }

    pub fn store(&self) -> &'a dyn DocumentStore {
        self.store
    }

    fn scoped<T: Entity>(&self, mut filter: Document) -> Document {
        if T::TENANT_SCOPED {
            if let Some(tenant_id) = self.tenant_id {
                filter.insert("tenant_id", tenant_id);
            }
        }
        filter
    }

    fn cached<T: Entity>(&self, public_id: i64) -> Option<ObjectId> {
        if !T::CACHED {
            return None;
        }
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(T::COLLECTION, public_id))
            .copied()
    }

    fn remember<T: Entity>(&self, entity: &T) {
        if T::CACHED {
            self.cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert((T::COLLECTION, entity.public_id()), entity.id());
        }
    }

    pub async fn by_id<T: Entity>(&self, id: ObjectId) -> Result<Option<T>> {
        Repository::<T>::new(self.store).get(id).await
    }

    pub async fn by_public_id<T: Entity>(&self, public_id: i64) -> Result<Option<T>> {
        if let Some(id) = self.cached::<T>(public_id) {
            if let Some(found) = self.by_id::<T>(id).await? {
                return Ok(Some(found));
            }
        }

        let filter = self.scoped::<T>(doc! { "public_id": public_id });
        let found = Repository::<T>::new(self.store).find_one(filter).await?;
        if let Some(entity) = &found {
            self.remember(entity);
        }
        Ok(found)
    }

    pub async fn by_email<T: Entity>(&self, email: &str) -> Result<Option<T>> {
        let filter = self.scoped::<T>(doc! { "email": email });
        Repository::<T>::new(self.store).find_one(filter).await
    }

    pub async fn tenant_by_schema_name(&self, schema_name: &str) -> Result<Option<Tenant>> {
        Repository::<Tenant>::new(self.store)
            .find_one(doc! { "schema_name": schema_name })
            .await
    }

    /// Resolve a nullable legacy foreign key. `None` and `0` mean "no
    /// reference" and never touch the store.
    pub async fn legacy<T: Entity>(&self, legacy_id: Option<i64>) -> Result<Option<T>> {
        match legacy_id {
            None | Some(0) => Ok(None),
            Some(id) => {
                let found = self.by_public_id::<T>(id).await?;
                if found.is_none() {
                    debug!("{} with legacy ID# {} not migrated", T::KIND, id);
                }
                Ok(found)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Audit, Status, Tag};
    use crate::store::MemoryStore;

    fn tag(tenant_id: ObjectId, public_id: i64, text: &str) -> Tag {
        Tag {
            id: ObjectId::new(),
            tenant_id,
            public_id,
            text: text.to_string(),
            description: String::new(),
            status: Status::Active,
            audit: Audit::default(),
        }
    }

    #[tokio::test]
    async fn test_legacy_lookup_is_tenant_scoped() {
        let store = MemoryStore::new();
        let mine = ObjectId::new();
        let theirs = ObjectId::new();
        let repo = Repository::<Tag>::new(&store);
        repo.insert(&tag(theirs, 5, "theirs")).await.unwrap();
        repo.insert(&tag(mine, 5, "mine")).await.unwrap();

        let resolver = Resolver::for_tenant(&store, mine);
        let found: Tag = resolver.legacy(Some(5)).await.unwrap().unwrap();
        assert_eq!(found.text, "mine");
    }

    #[tokio::test]
    async fn test_absent_and_zero_are_none() {
        let store = MemoryStore::new();
        let resolver = Resolver::for_tenant(&store, ObjectId::new());
        assert!(resolver.legacy::<Tag>(None).await.unwrap().is_none());
        assert!(resolver.legacy::<Tag>(Some(0)).await.unwrap().is_none());
        assert!(resolver.legacy::<Tag>(Some(42)).await.unwrap().is_none());
    }
}
