use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub mod proto {
    tonic::include_proto!("blog");
}

use proto::blog_service_client::BlogServiceClient;
use proto::*;

#[derive(Parser)]
#[command(name = "blog")]
#[command(about = "CLI for the blog service", long_about = None)]
struct Cli {
    /// gRPC server address
    #[arg(short, long, default_value = "http://127.0.0.1:50051")]
    server: String,

    /// CA certificate used to verify the server. Plaintext when absent.
    #[arg(long, default_value = "ssl/ca.crt")]
    ca_cert: PathBuf,

    /// Server name expected in the TLS certificate
    #[arg(long, default_value = "localhost")]
    domain: String,

    /// Deadline for each call in seconds
    #[arg(long, default_value = "3")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new blog post
    Create {
        /// Author ID
        #[arg(short, long)]
        author: String,

        /// Title
        #[arg(short, long)]
        title: String,

        /// Content
        #[arg(short, long)]
        content: String,
    },

    /// Show a blog post
    Read {
        /// Blog ID
        id: String,
    },

    /// Overwrite a blog post
    Update {
        /// Blog ID
        id: String,

        /// Author ID
        #[arg(short, long)]
        author: String,

        /// Title
        #[arg(short, long)]
        title: String,

        /// Content
        #[arg(short, long)]
        content: String,
    },

    /// Delete a blog post
    Delete {
        /// Blog ID
        id: String,
    },
}

/// TLS requires an https URL; switch a plain http one over.
fn tls_url(server: &str) -> String {
    match server.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => server.to_string(),
    }
}

async fn connect(cli: &Cli) -> Result<BlogServiceClient<Channel>, Box<dyn std::error::Error>> {
    let endpoint = match tokio::fs::read(&cli.ca_cert).await {
        Ok(pem) => {
            let tls = ClientTlsConfig::new()
                .ca_certificate(Certificate::from_pem(pem))
                .domain_name(cli.domain.clone());
            Endpoint::from_shared(tls_url(&cli.server))?.tls_config(tls)?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(ca_cert = %cli.ca_cert.display(), "CA certificate not found, connecting without TLS");
            warn!("Running without TLS is not recommended outside of development");
            Endpoint::from_shared(cli.server.clone())?
        }
        Err(e) => {
            return Err(format!("Cannot read CA certificate {}: {}", cli.ca_cert.display(), e).into());
        }
    };

    let channel = endpoint
        .connect()
        .await
        .map_err(|_| format!("Cannot connect to blog server at {}", cli.server))?;
    Ok(BlogServiceClient::new(channel))
}

fn request<T>(message: T, timeout: Duration) -> Request<T> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    request
}

fn status_error(status: Status) -> Box<dyn std::error::Error> {
    format!("{:?}: {}", status.code(), status.message()).into()
}

fn print_blog(blog: &Blog) {
    println!("ID:      {}", blog.id);
    println!("Author:  {}", blog.author_id);
    println!("Title:   {}", blog.title);
    println!("Content: {}", blog.content);
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect(&cli).await?;
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Commands::Create {
            author,
            title,
            content,
        } => {
            let blog = Blog {
                id: String::new(),
                author_id: author,
                title,
                content,
            };
            let response = client
                .create_blog(request(CreateBlogRequest { blog: Some(blog) }, timeout))
                .await
                .map_err(status_error)?;
            println!("Created blog:");
            print_blog(&response.into_inner().blog.unwrap_or_default());
        }

        Commands::Read { id } => {
            let response = client
                .read_blog(request(ReadBlogRequest { id }, timeout))
                .await
                .map_err(status_error)?;
            print_blog(&response.into_inner().blog.unwrap_or_default());
        }

        Commands::Update {
            id,
            author,
            title,
            content,
        } => {
            let blog = Blog {
                id,
                author_id: author,
                title,
                content,
            };
            let response = client
                .update_blog(request(UpdateBlogRequest { blog: Some(blog) }, timeout))
                .await
                .map_err(status_error)?;
            println!("Updated blog:");
            print_blog(&response.into_inner().blog.unwrap_or_default());
        }

        Commands::Delete { id } => {
            client
                .delete_blog(request(DeleteBlogRequest { id: id.clone() }, timeout))
                .await
                .map_err(status_error)?;
            println!("Deleted blog: {}", id);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
