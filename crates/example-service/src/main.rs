//! Example Service
//!
//! Registers a socket in a dumpsys registry directory and answers dump
//! requests with its status until interrupted.
//!
//! # Usage
//!
//! ```bash
//! ./example-service --name Valet --dir /tmp/dumpsys/services
//! ./example-service --name camera --dir /tmp/dumpsys/hardware --hardware
//! DUMPSYS_SERVICES_DIR=/tmp/dumpsys/services dumpsys Valet -a
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dumpsys_socket::{socket_path, DumpServer, DEFAULT_HARDWARE_DIR, DEFAULT_SERVICES_DIR};
use example_service::StatusService;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "example-service")]
#[command(about = "Example service answering dumpsys dump requests")]
struct Args {
    /// Name to register under
    #[arg(short, long)]
    name: String,

    /// Registry directory (defaults to the general or hardware directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Register as a hardware service
    #[arg(long)]
    hardware: bool,

    /// Stall each dump by this many milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        "example_service=debug,dumpsys_socket=debug"
    } else {
        "example_service=info,dumpsys_socket=info"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let dir = args.dir.clone().unwrap_or_else(|| {
        PathBuf::from(if args.hardware {
            DEFAULT_HARDWARE_DIR
        } else {
            DEFAULT_SERVICES_DIR
        })
    });
    let path = socket_path(&dir, &args.name.as_str().into());

    let service =
        StatusService::new(args.name.as_str()).with_delay(Duration::from_millis(args.delay_ms));
    let server = DumpServer::bind(&path, Arc::new(service))
        .with_context(|| format!("Failed to register {}", args.name))?;

    info!(name = %args.name, path = %path.display(), "Service registered");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down");
    server.shutdown().await;
    Ok(())
}
