//! Optional TLS for the gRPC listener.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Cannot access TLS certificate {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid TLS identity {cert} / {key}: {source}")]
    Identity {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: tonic::transport::Error,
    },
}

async fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the server identity if a certificate is present.
///
/// A missing certificate only disables TLS. Any other failure to access
/// the certificate or key is an error.
pub async fn load_server_tls(cert: &Path, key: &Path) -> Result<Option<ServerTlsConfig>, TlsError> {
    match tokio::fs::metadata(cert).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(cert = %cert.display(), "TLS certificate not found, serving without TLS");
            warn!("Running without TLS is not recommended outside of development");
            return Ok(None);
        }
        Err(source) => {
            return Err(TlsError::Access {
                path: cert.to_path_buf(),
                source,
            });
        }
    }

    let cert_pem = read_pem(cert).await?;
    let key_pem = read_pem(key).await?;

    let config = ServerTlsConfig::new().identity(Identity::from_pem(cert_pem, key_pem));

    // PEM contents are only parsed when the acceptor is built
    Server::builder()
        .tls_config(config.clone())
        .map_err(|source| TlsError::Identity {
            cert: cert.to_path_buf(),
            key: key.to_path_buf(),
            source,
        })?;

    info!(cert = %cert.display(), key = %key.display(), "TLS enabled");
    Ok(Some(config))
}
