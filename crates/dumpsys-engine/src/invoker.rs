//! Bounded dump invoker
//!
//! Runs one dump against a resolved handle and waits for it at most
//! `timeout`. The remote call runs on its own task writing into a private
//! pipe; the caller races "pipe drained and call returned" against a timer.
//! When the timer wins the task is left running detached and the read end of
//! the pipe is dropped, so anything it writes later is rejected with
//! `BrokenPipe` and never reaches a report.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dumpsys_core::{dump_pipe, DumpError, ServiceHandle};
use tokio::time::Instant;
use tracing::debug;

/// Pipe buffer between a service and the invoker
pub const DEFAULT_PIPE_CAPACITY: usize = 64 * 1024;

/// Result of one bounded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// The call returned before the deadline
    Completed { text: Bytes, elapsed: Duration },
    /// The deadline elapsed first; nothing captured is kept
    TimedOut { elapsed: Duration },
    /// The call returned an error before the deadline; `text` holds what it
    /// wrote before failing
    Failed {
        text: Bytes,
        elapsed: Duration,
        error: DumpError,
    },
}

/// Capability to run one dump under a deadline
#[async_trait]
pub trait DumpInvoker: Send + Sync {
    /// Dump `handle` with `args`, giving up after `timeout`
    async fn invoke(
        &self,
        handle: ServiceHandle,
        args: &[String],
        timeout: Duration,
    ) -> Invocation;
}

/// [`DumpInvoker`] backed by a detached task and an in-memory pipe
#[derive(Debug, Clone)]
pub struct BoundedInvoker {
    pipe_capacity: usize,
}

impl BoundedInvoker {
    pub fn new() -> Self {
        Self::with_pipe_capacity(DEFAULT_PIPE_CAPACITY)
    }

    pub fn with_pipe_capacity(pipe_capacity: usize) -> Self {
        Self { pipe_capacity }
    }
}

impl Default for BoundedInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DumpInvoker for BoundedInvoker {
    async fn invoke(
        &self,
        handle: ServiceHandle,
        args: &[String],
        timeout: Duration,
    ) -> Invocation {
        let started = Instant::now();
        let (sink, mut source) = dump_pipe(self.pipe_capacity);

        let args = args.to_vec();
        let remote = tokio::spawn(async move { handle.dump(sink, &args).await });

        // The sink is dropped when the call returns, which ends `read_all`
        let completion = async move {
            let captured = source.read_all().await;
            let status = remote.await;
            (captured, status)
        };

        let (captured, status) = match tokio::time::timeout(timeout, completion).await {
            Ok(done) => done,
            Err(_) => {
                let elapsed = started.elapsed();
                debug!(elapsed_ms = elapsed.as_millis() as u64, "Dump deadline elapsed");
                return Invocation::TimedOut { elapsed };
            }
        };

        let elapsed = started.elapsed();
        let (text, error) = match (captured, status) {
            (Ok(text), Ok(Ok(()))) => return Invocation::Completed { text, elapsed },
            (Err(err), Ok(Ok(()))) => (Bytes::new(), err.into()),
            (captured, Ok(Err(err))) => (captured.unwrap_or_default(), err),
            (captured, Err(join_err)) => (
                captured.unwrap_or_default(),
                DumpError::Internal(format!("dump task failed: {}", join_err)),
            ),
        };
        Invocation::Failed {
            text,
            elapsed,
            error,
        }
    }
}
