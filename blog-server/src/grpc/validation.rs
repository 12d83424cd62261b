//! Input validation for gRPC requests.
//!
//! Only identifiers are validated; field contents are stored as given.

use mongodb::bson::oid::{self, ObjectId};
use thiserror::Error;

/// Validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Blog id is required")]
    IdRequired,

    #[error("Invalid blog id '{id}': {source}")]
    InvalidId {
        id: String,
        #[source]
        source: oid::Error,
    },
}

/// Parse a 24-character hex string into an ObjectId.
pub fn parse_blog_id(id: &str) -> Result<ObjectId, ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::IdRequired);
    }
    ObjectId::parse_str(id).map_err(|source| ValidationError::InvalidId {
        id: id.to_string(),
        source,
    })
}
