//! BlogStore trait definition.
//!
//! Abstracts the document collection so the gRPC handlers work with
//! `BlogItem`s instead of driver calls. Implemented by the MongoDB
//! collection binding and by an in-memory map.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::error::Result;

/// A blog post as stored in the collection.
///
/// `id` is `None` only before insertion; it is left out of the serialized
/// document so the store assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub author_id: String,
    pub title: String,
    pub content: String,
}

impl BlogItem {
    /// Create an item that has not been persisted yet.
    pub fn new(author_id: String, title: String, content: String) -> Self {
        Self {
            id: None,
            author_id,
            title,
            content,
        }
    }

    /// Same fields, bound to `id`.
    pub fn with_id(self, id: ObjectId) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

/// Storage operations for blog posts.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a new item and return the identifier the store assigned.
    async fn insert(&self, item: &BlogItem) -> Result<ObjectId>;

    /// Look up a single item by identifier.
    async fn find(&self, id: ObjectId) -> Result<Option<BlogItem>>;

    /// Atomically replace the item stored at `id`.
    ///
    /// Returns the stored item, or `None` if nothing matched (no write).
    async fn replace(&self, id: ObjectId, item: &BlogItem) -> Result<Option<BlogItem>>;

    /// Delete the item at `id`. Returns `true` if a document was removed.
    async fn delete(&self, id: ObjectId) -> Result<bool>;
}
