//! Dump transport client - a [`Dumpable`] backed by a service socket

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use dumpsys_core::{DumpError, DumpResult, DumpSink, Dumpable, ServiceName};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::debug;

use crate::protocol::DumpRequest;

/// A live service reachable through its socket
#[derive(Debug, Clone)]
pub struct SocketService {
    name: ServiceName,
    path: PathBuf,
    connect_timeout: Duration,
}

impl SocketService {
    pub fn new(name: ServiceName, path: PathBuf, connect_timeout: Duration) -> Self {
        Self {
            name,
            path,
            connect_timeout,
        }
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> DumpResult<UnixStream> {
        match tokio::time::timeout(self.connect_timeout, UnixStream::connect(&self.path)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(err)) if is_gone(&err) => Err(DumpError::DeadObject),
            Ok(Err(err)) => Err(DumpError::Transport(format!(
                "connect {}: {}",
                self.path.display(),
                err
            ))),
            Err(_) => Err(DumpError::Transport(format!(
                "connect {}: timed out after {}ms",
                self.path.display(),
                self.connect_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl Dumpable for SocketService {
    async fn dump(&self, mut sink: DumpSink, args: &[String]) -> DumpResult<()> {
        let mut stream = self.connect().await?;

        let request = DumpRequest::new(args.to_vec())
            .encode()
            .map_err(|e| DumpError::Internal(format!("encode request: {}", e)))?;
        stream
            .write_all(&request)
            .await
            .map_err(|e| DumpError::Transport(format!("send request: {}", e)))?;
        stream
            .shutdown()
            .await
            .map_err(|e| DumpError::Transport(format!("half-close: {}", e)))?;

        let copied = tokio::io::copy(&mut stream, &mut sink).await?;
        debug!(service = %self.name, bytes = copied, "Dump transferred");

        sink.close().await
    }
}

/// Whether a connect error means nobody is serving the socket
pub(crate) fn is_gone(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionRefused | ErrorKind::NotFound
    )
}

/// Probe `path` with a throwaway connection
pub(crate) async fn probe(path: &Path, connect_timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(connect_timeout, UnixStream::connect(path)).await,
        Ok(Ok(_))
    )
}
