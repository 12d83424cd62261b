//! blog-server: gRPC CRUD service for blog posts stored in MongoDB.

pub mod config;
pub mod grpc;
pub mod server;
pub mod store;
pub mod tls;

pub use grpc::proto;
