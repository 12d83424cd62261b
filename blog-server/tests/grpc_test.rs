//! End-to-end tests over a real gRPC listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use blog_server::grpc::BlogServiceImpl;
use blog_server::proto::blog_service_client::BlogServiceClient;
use blog_server::proto::*;
use blog_server::server::{self, Backend};
use blog_server::store::{BlogStore, MemoryBlogStore, StoreError};
use mongodb::bson::oid::ObjectId;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic::{Code, Request};

struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), tonic::transport::Error>>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().unwrap();

        let shutdown = CancellationToken::new();
        let service = BlogServiceImpl::new(Arc::new(MemoryBlogStore::new()), shutdown.clone());
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(server::serve(listener, service, None, async move {
            let _ = stopped.await;
        }));

        Self {
            addr,
            shutdown,
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    async fn client(&self) -> BlogServiceClient<Channel> {
        let url = format!("http://{}", self.addr);
        for _ in 0..50 {
            if let Ok(client) = BlogServiceClient::connect(url.clone()).await {
                return client;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Server at {} did not come up", self.addr);
    }

    async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .expect("Server task panicked")
                .expect("Server returned error");
        }
    }
}

fn post(author_id: &str, title: &str, content: &str) -> Blog {
    Blog {
        id: String::new(),
        author_id: author_id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn test_crud_lifecycle() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    // Create
    let created = client
        .create_blog(CreateBlogRequest {
            blog: Some(post("A1", "T", "C")),
        })
        .await
        .expect("CreateBlog failed")
        .into_inner()
        .blog
        .unwrap();
    assert_eq!(created.id.len(), 24);

    // Read
    let fetched = client
        .read_blog(ReadBlogRequest {
            id: created.id.clone(),
        })
        .await
        .expect("ReadBlog failed")
        .into_inner()
        .blog
        .unwrap();
    assert_eq!(fetched, created);

    // Update
    let updated = client
        .update_blog(UpdateBlogRequest {
            blog: Some(Blog {
                id: created.id.clone(),
                author_id: "A2".to_string(),
                title: "T2".to_string(),
                content: "C2".to_string(),
            }),
        })
        .await
        .expect("UpdateBlog failed")
        .into_inner()
        .blog
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "T2");

    let fetched = client
        .read_blog(ReadBlogRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap()
        .into_inner()
        .blog
        .unwrap();
    assert_eq!(fetched, updated);

    // Delete
    client
        .delete_blog(DeleteBlogRequest {
            id: created.id.clone(),
        })
        .await
        .expect("DeleteBlog failed");

    let status = client
        .read_blog(ReadBlogRequest { id: created.id })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn test_invalid_id_over_the_wire() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let status = client
        .read_blog(ReadBlogRequest {
            id: "not-a-valid-id".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(status.message().contains("not-a-valid-id"));

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn test_client_deadline_is_accepted() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    let mut request = Request::new(CreateBlogRequest {
        blog: Some(post("A1", "T", "C")),
    });
    request.set_timeout(Duration::from_secs(5));

    assert!(client.create_blog(request).await.is_ok());

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn test_calls_cancelled_during_shutdown() {
    let server = TestServer::start().await;
    let mut client = server.client().await;

    server.shutdown.cancel();

    let status = client
        .create_blog(CreateBlogRequest {
            blog: Some(post("A1", "T", "C")),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Cancelled);

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_listener_before_store() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let memory = Arc::new(MemoryBlogStore::new());
    let backend = Backend::Memory(memory.clone());
    let shutdown = CancellationToken::new();
    let service = BlogServiceImpl::new(memory.clone(), shutdown.clone());

    let signal = shutdown.clone();
    let handle = tokio::spawn(server::serve(listener, service, None, async move {
        signal.cancelled().await;
    }));

    let mut client = BlogServiceClient::connect(format!("http://{addr}"))
        .await
        .expect("Failed to connect");
    let created = client
        .create_blog(CreateBlogRequest {
            blog: Some(post("A1", "T", "C")),
        })
        .await
        .unwrap()
        .into_inner()
        .blog
        .unwrap();
    let id = ObjectId::parse_str(&created.id).unwrap();

    shutdown.cancel();
    drop(client);
    handle
        .await
        .expect("Server task panicked")
        .expect("Server returned error");

    // Listener is gone, store still serves
    assert!(TcpStream::connect(addr).await.is_err());
    assert!(memory.find(id).await.unwrap().is_some());

    backend.close().await;
    assert!(matches!(
        memory.find(id).await,
        Err(StoreError::Unavailable(_))
    ));
}
