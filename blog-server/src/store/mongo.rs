//! MongoDB-backed store.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::error::{Result, StoreError};
use super::traits::{BlogItem, BlogStore};

/// Owns the driver client for the lifetime of the process.
pub struct MongoGateway {
    client: Client,
}

impl MongoGateway {
    /// Connect to the store at `uri`.
    ///
    /// The driver connects lazily, so a `ping` is issued to fail fast when
    /// the store is unreachable. `timeout` bounds server selection.
    pub async fn connect(uri: &str, timeout: Duration) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(StoreError::Connection)?;
        options.app_name = Some("blog-server".to_string());
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(StoreError::Connection)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connection)?;

        info!(uri = %uri, "Connected to document store");
        Ok(Self { client })
    }

    /// Bind to `collection` within `database`. No existence check.
    pub fn collection(&self, database: &str, collection: &str) -> MongoBlogStore {
        debug!(database = %database, collection = %collection, "Binding collection");
        MongoBlogStore {
            collection: self.client.database(database).collection(collection),
        }
    }

    /// Release the connection. Collections bound from this gateway stop
    /// working afterwards.
    pub async fn disconnect(self) {
        self.client.shutdown().await;
        info!("Disconnected from document store");
    }
}

/// A collection of blog documents.
#[derive(Clone)]
pub struct MongoBlogStore {
    collection: Collection<BlogItem>,
}

#[async_trait]
impl BlogStore for MongoBlogStore {
    async fn insert(&self, item: &BlogItem) -> Result<ObjectId> {
        let result = self.collection.insert_one(item).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::UnexpectedId(result.inserted_id.to_string()))
    }

    async fn find(&self, id: ObjectId) -> Result<Option<BlogItem>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn replace(&self, id: ObjectId, item: &BlogItem) -> Result<Option<BlogItem>> {
        let replacement = item.clone().with_id(id);
        Ok(self
            .collection
            .find_one_and_replace(doc! { "_id": id }, replacement)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
