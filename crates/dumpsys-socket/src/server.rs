//! Dump server - publishes any [`Dumpable`] on a service socket

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dumpsys_core::{DumpSink, ServiceHandle};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ServerError, ServerResult};
use crate::protocol::{DumpRequest, MAX_REQUEST_LEN};

/// A socket server answering dump requests until shut down or dropped
pub struct DumpServer {
    path: PathBuf,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DumpServer {
    /// Bind `path` and start serving `dumpable`.
    ///
    /// A leftover socket file nobody listens on is replaced. Must be called
    /// from within a tokio runtime.
    pub fn bind(path: impl Into<PathBuf>, dumpable: ServiceHandle) -> ServerResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ServerError::Bind {
                path: path.clone(),
                source,
            })?;
        }

        let listener = bind_listener(&path)?;
        info!(path = %path.display(), "Dump server listening");

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => {
                            tokio::spawn(serve_connection(stream, dumpable.clone()));
                        }
                        Err(err) => warn!(error = %err, "Accept failed"),
                    },
                }
            }
        });

        Ok(Self {
            path,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop accepting, wait for the accept loop and remove the socket file
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        remove_socket(&self.path);
    }
}

impl Drop for DumpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        remove_socket(&self.path);
    }
}

fn bind_listener(path: &Path) -> ServerResult<UnixListener> {
    match UnixListener::bind(path) {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == ErrorKind::AddrInUse => {
            if std::os::unix::net::UnixStream::connect(path).is_ok() {
                return Err(ServerError::AddrInUse(path.to_path_buf()));
            }

            debug!(path = %path.display(), "Replacing stale socket");
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(source) if source.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ServerError::StaleSocket {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            }
            UnixListener::bind(path).map_err(|source| ServerError::Bind {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(ServerError::Bind {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn remove_socket(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "Failed to remove socket");
        }
    }
}

async fn serve_connection(stream: UnixStream, dumpable: ServiceHandle) {
    let (read_half, write_half) = stream.into_split();

    let mut line = String::new();
    let mut reader = BufReader::new(read_half).take(MAX_REQUEST_LEN as u64);
    match reader.read_line(&mut line).await {
        // Liveness probe: connected and went away without a request
        Ok(0) => return,
        Ok(_) => {}
        Err(err) => {
            debug!(error = %err, "Failed to read dump request");
            return;
        }
    }

    let request = match DumpRequest::decode(&line) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "Invalid dump request");
            return;
        }
    };

    debug!(args = request.args.len(), "Serving dump request");
    if let Err(err) = dumpable.dump(DumpSink::new(write_half), &request.args).await {
        debug!(error = %err, "Dump ended with error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dumpsys_core::testing::MockService;
    use tokio::io::AsyncWriteExt;

    async fn request(path: &Path, args: &[&str]) -> String {
        let mut stream = UnixStream::connect(path).await.unwrap();
        let args = args.iter().map(|s| s.to_string()).collect();
        stream
            .write_all(&DumpRequest::new(args).encode().unwrap())
            .await
            .unwrap();
        stream.shutdown().await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_dump_with_args() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(MockService::new("I DO!"));
        let server = DumpServer::bind(dir.path().join("SERVICE.sock"), service.clone()).unwrap();

        assert_eq!(request(server.path(), &["Y", "U", "NO"]).await, "I DO!");
        assert_eq!(
            service.calls(),
            vec![vec!["Y".to_string(), "U".to_string(), "NO".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_probe_connection_does_not_dump() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(MockService::new("unused"));
        let server = DumpServer::bind(dir.path().join("Valet.sock"), service.clone()).unwrap();

        drop(UnixStream::connect(server.path()).await.unwrap());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Valet.sock");
        drop(std::os::unix::net::UnixListener::bind(&path).unwrap());
        assert!(path.exists());

        let server = DumpServer::bind(&path, Arc::new(MockService::new("parked"))).unwrap();
        assert_eq!(request(server.path(), &[]).await, "parked");
    }

    #[tokio::test]
    async fn test_refuses_live_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Valet.sock");
        let _first = DumpServer::bind(&path, Arc::new(MockService::new("one"))).unwrap();

        let second = DumpServer::bind(&path, Arc::new(MockService::new("two")));
        assert!(matches!(second, Err(ServerError::AddrInUse(_))));
    }

    #[tokio::test]
    async fn test_shutdown_removes_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Valet.sock");
        let server = DumpServer::bind(&path, Arc::new(MockService::new("parked"))).unwrap();
        assert!(path.exists());

        server.shutdown().await;
        assert!(!path.exists());
    }
}
