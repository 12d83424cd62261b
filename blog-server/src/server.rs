//! Server lifecycle: store backend, listener, and shutdown.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Server, ServerTlsConfig};
use tracing::info;

use crate::config::Args;
use crate::grpc::BlogServiceImpl;
use crate::grpc::proto::blog_service_server::BlogServiceServer;
use crate::store::{BlogStore, MemoryBlogStore, MongoGateway, StoreError};

/// The store the server was started with.
pub enum Backend {
    Mongo(MongoGateway),
    Memory(Arc<MemoryBlogStore>),
}

impl Backend {
    /// Connect to the configured store and bind the blog collection.
    pub async fn open(args: &Args) -> Result<(Self, Arc<dyn BlogStore>), StoreError> {
        if args.dev {
            info!("Development mode: using in-memory store");
            let memory = Arc::new(MemoryBlogStore::new());
            let store: Arc<dyn BlogStore> = memory.clone();
            return Ok((Backend::Memory(memory), store));
        }

        info!(uri = %args.mongo_uri, "Connecting to MongoDB");
        let gateway = MongoGateway::connect(&args.mongo_uri, args.connect_timeout()).await?;

        info!(database = %args.database, collection = %args.collection, "Fetching collection");
        let store: Arc<dyn BlogStore> =
            Arc::new(gateway.collection(&args.database, &args.collection));
        Ok((Backend::Mongo(gateway), store))
    }

    /// Disconnect from the store.
    pub async fn close(self) {
        match self {
            Backend::Mongo(gateway) => gateway.disconnect().await,
            Backend::Memory(store) => store.close(),
        }
    }
}

/// SIGINT/SIGTERM listeners, installed before the server starts.
pub struct ShutdownSignals {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves on the first signal received.
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigint.recv() => info!("Received SIGINT"),
            _ = self.sigterm.recv() => info!("Received SIGTERM"),
        }
    }
}

/// Serve the blog service on `listener` until `shutdown` resolves.
///
/// The listener is closed when this returns.
pub async fn serve<F>(
    listener: TcpListener,
    service: BlogServiceImpl,
    tls: Option<ServerTlsConfig>,
    shutdown: F,
) -> Result<(), tonic::transport::Error>
where
    F: Future<Output = ()> + Send,
{
    let mut builder = Server::builder();
    if let Some(tls) = tls {
        builder = builder.tls_config(tls)?;
    }

    builder
        .add_service(BlogServiceServer::new(service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
}
