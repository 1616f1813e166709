//! MongoDB document store.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, ClientSession, Collection, Database};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{redact_uri, TargetConfig};
use crate::error::{MigrateError, Result};

use super::DocumentStore;

/// Handle on the target database. Holds at most one open session, used
/// while a transaction is in progress.
pub struct MongoStore {
    client: Client,
    database: Database,
    session: Mutex<Option<ClientSession>>,
}

impl MongoStore {
    /// Connect and ping the target database.
    pub async fn connect(config: &TargetConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        info!(
            "Connected to MongoDB: {}/{}",
            redact_uri(&config.uri),
            config.database
        );

        Ok(Self {
            client,
            database,
            session: Mutex::new(None),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()> {
        let coll = self.collection(collection);
        let mut session = self.session.lock().await;
        match session.as_mut() {
            Some(s) => coll.insert_one(doc).session(s).await?,
            None => coll.insert_one(doc).await?,
        };
        Ok(())
    }

    async fn replace_one(&self, collection: &str, id: ObjectId, doc: Document) -> Result<()> {
        let coll = self.collection(collection);
        let filter = doc! { "_id": id };
        let mut session = self.session.lock().await;
        let result = match session.as_mut() {
            Some(s) => coll.replace_one(filter, doc).session(s).await?,
            None => coll.replace_one(filter, doc).await?,
        };
        if result.matched_count == 0 {
            return Err(MigrateError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_hex(),
            });
        }
        Ok(())
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> Result<()> {
        let coll = self.collection(collection);
        let filter = doc! { "_id": id };
        let mut session = self.session.lock().await;
        match session.as_mut() {
            Some(s) => coll.delete_one(filter).session(s).await?,
            None => coll.delete_one(filter).await?,
        };
        Ok(())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let coll = self.collection(collection);
        let mut session = self.session.lock().await;
        let found = match session.as_mut() {
            Some(s) => {
                coll.find_one(filter)
                    .sort(doc! { "_id": 1 })
                    .session(s)
                    .await?
            }
            None => coll.find_one(filter).sort(doc! { "_id": 1 }).await?,
        };
        Ok(found)
    }

    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        let coll = self.collection(collection);
        let mut session = self.session.lock().await;
        let docs: Vec<Document> = match session.as_mut() {
            Some(s) => {
                let mut cursor = coll
                    .find(filter)
                    .sort(doc! { "_id": 1 })
                    .session(&mut *s)
                    .await?;
                cursor.stream(s).try_collect().await?
            }
            None => {
                coll.find(filter)
                    .sort(doc! { "_id": 1 })
                    .await?
                    .try_collect()
                    .await?
            }
        };
        debug!("Found {} documents in {}", docs.len(), collection);
        Ok(docs)
    }

    async fn start_transaction(&self) -> Result<()> {
        let mut guard = self.session.lock().await;
        if guard.is_some() {
            return Err(MigrateError::Config(
                "a document store transaction is already open".to_string(),
            ));
        }
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        *guard = Some(session);
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        if let Some(mut session) = self.session.lock().await.take() {
            session.commit_transaction().await?;
        }
        Ok(())
    }

    async fn abort_transaction(&self) -> Result<()> {
        if let Some(mut session) = self.session.lock().await.take() {
            session.abort_transaction().await?;
        }
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mongodb"
    }
}
