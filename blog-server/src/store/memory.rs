//! In-memory store for development mode and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::error::{Result, StoreError};
use super::traits::{BlogItem, BlogStore};

/// Ephemeral `BlogStore` backed by a map. Identifiers are generated the
/// same way the document store generates them.
#[derive(Default)]
pub struct MemoryBlogStore {
    items: RwLock<HashMap<ObjectId, BlogItem>>,
    closed: AtomicBool,
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all further operations, mirroring a disconnected client.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn insert(&self, item: &BlogItem) -> Result<ObjectId> {
        self.ensure_open()?;
        let id = ObjectId::new();
        self.items
            .write()
            .await
            .insert(id, item.clone().with_id(id));
        Ok(id)
    }

    async fn find(&self, id: ObjectId) -> Result<Option<BlogItem>> {
        self.ensure_open()?;
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn replace(&self, id: ObjectId, item: &BlogItem) -> Result<Option<BlogItem>> {
        self.ensure_open()?;
        let mut items = self.items.write().await;
        match items.get_mut(&id) {
            Some(stored) => {
                *stored = item.clone().with_id(id);
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.items.write().await.remove(&id).is_some())
    }
}
