//! Command-line configuration for the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "blog-server")]
#[command(about = "gRPC blog post service backed by MongoDB")]
pub struct Args {
    /// gRPC listen address
    #[arg(short, long, default_value = "0.0.0.0:50051")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    /// Database holding the blog collection
    #[arg(long, default_value = "grpcblog")]
    pub database: String,

    /// Collection name
    #[arg(long, default_value = "blog")]
    pub collection: String,

    /// Seconds to wait for the store before giving up at startup
    #[arg(long, default_value = "10")]
    pub connect_timeout_secs: u64,

    /// Server certificate (PEM). TLS is disabled when the file is absent.
    #[arg(long, default_value = "ssl/server.crt")]
    pub tls_cert: PathBuf,

    /// Server private key (PEM)
    #[arg(long, default_value = "ssl/server.pem")]
    pub tls_key: PathBuf,

    /// Run in development mode (in-memory store, no MongoDB)
    #[arg(long)]
    pub dev: bool,
}

impl Args {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["blog-server"]).unwrap();
        assert_eq!(args.listen, "0.0.0.0:50051".parse().unwrap());
        assert_eq!(args.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(args.database, "grpcblog");
        assert_eq!(args.collection, "blog");
        assert_eq!(args.connect_timeout(), Duration::from_secs(10));
        assert_eq!(args.tls_cert, PathBuf::from("ssl/server.crt"));
        assert_eq!(args.tls_key, PathBuf::from("ssl/server.pem"));
        assert!(!args.dev);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "blog-server",
            "-l",
            "127.0.0.1:6000",
            "--mongo-uri",
            "mongodb://db:27017",
            "--collection",
            "posts",
            "--connect-timeout-secs",
            "2",
            "--dev",
        ])
        .unwrap();
        assert_eq!(args.listen, "127.0.0.1:6000".parse().unwrap());
        assert_eq!(args.mongo_uri, "mongodb://db:27017");
        assert_eq!(args.collection, "posts");
        assert_eq!(args.connect_timeout(), Duration::from_secs(2));
        assert!(args.dev);
    }

    #[test]
    fn test_rejects_bad_listen_address() {
        assert!(Args::try_parse_from(["blog-server", "--listen", "nowhere"]).is_err());
    }
}
