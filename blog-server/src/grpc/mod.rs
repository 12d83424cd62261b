//! gRPC server module for the blog service.

pub mod context;
pub mod service;
pub mod validation;

/// Generated proto types.
pub mod proto {
    tonic::include_proto!("blog");
}

pub use context::{CallContext, Cancellation};
pub use service::BlogServiceImpl;
