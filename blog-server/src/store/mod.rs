//! Document store gateway.

mod error;
mod memory;
mod mongo;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryBlogStore;
pub use mongo::{MongoBlogStore, MongoGateway};
pub use traits::{BlogItem, BlogStore};
