//! Dump destination handed to a service
//!
//! A [`DumpSink`] is the writable end a service dumps into. The orchestrator
//! holds the matching [`DumpSource`] and reads until the sink is dropped.
//! Once the source is gone, further writes fail with `BrokenPipe` instead of
//! reaching anyone, so a service that finishes after its deadline cannot
//! disturb a report that was already produced.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};

use crate::error::DumpResult;

const READ_CHUNK: usize = 8 * 1024;

/// Create a connected sink/source pair buffering at most `capacity` bytes
pub fn dump_pipe(capacity: usize) -> (DumpSink, DumpSource) {
    let (writer, reader) = tokio::io::duplex(capacity);
    (DumpSink::new(writer), DumpSource::new(reader))
}

/// Writable end of a dump destination
pub struct DumpSink {
    inner: Box<dyn AsyncWrite + Send + Unpin>,
}

impl DumpSink {
    /// Wrap any async writer, e.g. the write half of a socket
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            inner: Box::new(writer),
        }
    }

    /// Write all of `data`
    pub async fn write(&mut self, data: impl AsRef<[u8]>) -> DumpResult<()> {
        self.inner.write_all(data.as_ref()).await?;
        Ok(())
    }

    /// Write a line of text followed by `\n`
    pub async fn write_line(&mut self, line: &str) -> DumpResult<()> {
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.write_all(b"\n").await?;
        Ok(())
    }

    /// Flush and close the destination
    pub async fn close(mut self) -> DumpResult<()> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

impl std::fmt::Debug for DumpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpSink").finish_non_exhaustive()
    }
}

impl AsyncWrite for DumpSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Readable end of a dump destination, owned by the orchestrator
#[derive(Debug)]
pub struct DumpSource {
    inner: DuplexStream,
}

impl DumpSource {
    fn new(inner: DuplexStream) -> Self {
        Self { inner }
    }

    /// Read everything until the sink is closed or dropped
    pub async fn read_all(&mut self) -> io::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        loop {
            buf.reserve(READ_CHUNK);
            if self.inner.read_buf(&mut buf).await? == 0 {
                return Ok(buf.freeze());
            }
        }
    }
}

impl AsyncRead for DumpSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}
