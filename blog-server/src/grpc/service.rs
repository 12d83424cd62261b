//! gRPC BlogService implementation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};

use super::context::CallContext;
use super::proto::blog_service_server::BlogService;
use super::proto::*;
use super::validation::{ValidationError, parse_blog_id};
use crate::store::{BlogItem, BlogStore};

fn validation_err_to_status(e: ValidationError) -> Status {
    warn!(error = %e, "Rejected blog id");
    Status::invalid_argument(e.to_string())
}

/// Fail with `Cancelled` if the call is already cancelled.
fn ensure_active(ctx: &CallContext, operation: &str) -> Result<(), Status> {
    match ctx.cancelled() {
        Some(reason) => {
            warn!(operation, reason = %reason, "Call cancelled");
            Err(Status::cancelled(format!("{operation} cancelled: {reason}")))
        }
        None => Ok(()),
    }
}

/// Convert a stored item to the proto Blog.
fn item_to_proto(item: &BlogItem) -> Blog {
    Blog {
        id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
        author_id: item.author_id.clone(),
        title: item.title.clone(),
        content: item.content.clone(),
    }
}

/// BlogService gRPC implementation.
///
/// Stateless apart from the injected store; calls run concurrently.
pub struct BlogServiceImpl {
    store: Arc<dyn BlogStore>,
    shutdown: CancellationToken,
}

impl BlogServiceImpl {
    pub fn new(store: Arc<dyn BlogStore>, shutdown: CancellationToken) -> Self {
        Self { store, shutdown }
    }

    fn context<T>(&self, request: &Request<T>) -> CallContext {
        CallContext::from_metadata(request.metadata(), &self.shutdown)
    }
}

#[tonic::async_trait]
impl BlogService for BlogServiceImpl {
    async fn create_blog(
        &self,
        request: Request<CreateBlogRequest>,
    ) -> Result<Response<CreateBlogResponse>, Status> {
        let ctx = self.context(&request);
        let blog = request.into_inner().blog.unwrap_or_default();

        ensure_active(&ctx, "CreateBlog")?;

        // Any client-supplied id is dropped; the store assigns one.
        let item = BlogItem::new(blog.author_id, blog.title, blog.content);
        let id = self.store.insert(&item).await.map_err(|e| {
            error!(error = %e, "Failed to insert blog");
            Status::internal(format!("Failed to insert blog: {e}"))
        })?;

        let blog = item_to_proto(&item.with_id(id));
        info!(id = %blog.id, author_id = %blog.author_id, "Blog created");

        Ok(Response::new(CreateBlogResponse { blog: Some(blog) }))
    }

    async fn read_blog(
        &self,
        request: Request<ReadBlogRequest>,
    ) -> Result<Response<ReadBlogResponse>, Status> {
        let ctx = self.context(&request);
        let req = request.into_inner();

        let id = parse_blog_id(&req.id).map_err(validation_err_to_status)?;
        ensure_active(&ctx, "ReadBlog")?;

        let item = match self.store.find(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                warn!(id = %id, "Blog not found");
                return Err(Status::not_found(format!("Blog not found: {id}")));
            }
            Err(e) => {
                error!(id = %id, error = %e, "Failed to read blog");
                return Err(Status::not_found(format!("Cannot find blog {id}: {e}")));
            }
        };

        info!(id = %id, "Blog read");
        Ok(Response::new(ReadBlogResponse {
            blog: Some(item_to_proto(&item)),
        }))
    }

    async fn update_blog(
        &self,
        request: Request<UpdateBlogRequest>,
    ) -> Result<Response<UpdateBlogResponse>, Status> {
        let ctx = self.context(&request);
        let blog = request.into_inner().blog.unwrap_or_default();

        let id = parse_blog_id(&blog.id).map_err(validation_err_to_status)?;
        ensure_active(&ctx, "UpdateBlog")?;

        let item = BlogItem::new(blog.author_id, blog.title, blog.content).with_id(id);
        let stored = match self.store.replace(id, &item).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!(id = %id, "Blog not found for update");
                return Err(Status::not_found(format!("Blog not found: {id}")));
            }
            Err(e) => {
                error!(id = %id, error = %e, "Failed to replace blog");
                return Err(Status::unavailable(format!(
                    "Cannot update blog {id}, store unavailable: {e}"
                )));
            }
        };

        info!(id = %id, author_id = %stored.author_id, "Blog updated");
        Ok(Response::new(UpdateBlogResponse {
            blog: Some(item_to_proto(&stored)),
        }))
    }

    async fn delete_blog(
        &self,
        request: Request<DeleteBlogRequest>,
    ) -> Result<Response<DeleteBlogResponse>, Status> {
        let ctx = self.context(&request);
        let req = request.into_inner();

        let id = parse_blog_id(&req.id).map_err(validation_err_to_status)?;
        ensure_active(&ctx, "DeleteBlog")?;

        match self.store.delete(id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(id = %id, "Blog not found for delete");
                return Err(Status::not_found(format!("Blog not found: {id}")));
            }
            Err(e) => {
                error!(id = %id, error = %e, "Failed to delete blog");
                return Err(Status::not_found(format!("Cannot delete blog {id}: {e}")));
            }
        }

        info!(id = %id, "Blog deleted");
        Ok(Response::new(DeleteBlogResponse {}))
    }
}
