use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blog_server::config::Args;
use blog_server::grpc::BlogServiceImpl;
use blog_server::server::{self, Backend, ShutdownSignals};
use blog_server::tls::load_server_tls;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("blog_server=info".parse()?)
                .add_directive("h2=warn".parse()?),
        )
        .init();

    let args = Args::parse();
    info!("Starting blog server");

    // The store must be reachable before any call is accepted
    let (backend, store) = match Backend::open(&args).await {
        Ok(opened) => opened,
        Err(e) => {
            error!(error = %e, "Failed to open document store");
            std::process::exit(1);
        }
    };

    let tls = match load_server_tls(&args.tls_cert, &args.tls_key).await {
        Ok(tls) => tls,
        Err(e) => {
            error!(error = %e, "Failed to load TLS certificates");
            backend.close().await;
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(args.listen).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %args.listen, error = %e, "Failed to bind listener");
            backend.close().await;
            std::process::exit(1);
        }
    };

    let signals = ShutdownSignals::install()?;
    let shutdown = CancellationToken::new();
    let service = BlogServiceImpl::new(store, shutdown.clone());

    info!(addr = %args.listen, tls = tls.is_some(), "Starting gRPC server");

    let result = server::serve(listener, service, tls, async move {
        signals.recv().await;
        info!("Stopping server gracefully");
        shutdown.cancel();
    })
    .await;

    info!("Listener closed");
    if let Err(e) = &result {
        error!(error = %e, "gRPC server error");
    }

    info!("Closing document store");
    backend.close().await;

    info!("Server stopped");
    result.map_err(Into::into)
}
