//! A service that dumps its own status

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dumpsys_core::{DumpResult, DumpSink, Dumpable, ServiceName};
use parking_lot::Mutex;
use tracing::debug;

/// Dumps uptime, request count and the arguments it was called with
pub struct StatusService {
    name: ServiceName,
    started: Instant,
    delay: Duration,
    requests: AtomicU64,
    last_args: Mutex<Vec<String>>,
}

impl StatusService {
    pub fn new(name: impl Into<ServiceName>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
            delay: Duration::ZERO,
            requests: AtomicU64::new(0),
            last_args: Mutex::new(Vec::new()),
        }
    }

    /// Stall every dump by `delay`, e.g. to watch dumpsys time out
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dumpable for StatusService {
    async fn dump(&self, mut sink: DumpSink, args: &[String]) -> DumpResult<()> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = std::mem::replace(&mut *self.last_args.lock(), args.to_vec());
        debug!(service = %self.name, request, "Dump requested");

        if args.iter().any(|a| a == "-h" || a == "--help") {
            sink.write_line(&format!("{} dump options:", self.name)).await?;
            sink.write_line("  -h, --help    show this help").await?;
            sink.write_line("  any other arguments are echoed back").await?;
            return sink.close().await;
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        sink.write_line(&format!("Service: {}", self.name)).await?;
        sink.write_line(&format!(
            "Uptime: {:.1}s",
            self.started.elapsed().as_secs_f64()
        ))
        .await?;
        sink.write_line(&format!("Requests served: {}", request)).await?;
        sink.write_line(&format!("Args: {:?}", args)).await?;
        sink.write_line(&format!("Previous args: {:?}", previous)).await?;
        sink.close().await
    }
}
