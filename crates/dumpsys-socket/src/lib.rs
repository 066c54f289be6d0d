//! dumpsys-socket - Unix-socket service platform for dumpsys
//!
//! Services publish themselves as `<name>.sock` files in a registry
//! directory (one for general services, one for hardware services):
//!
//! ```text
//! /run/dumpsys/services/           /run/dumpsys/hardware/
//!   Locksmith.sock  ◄── DumpServer   camera.sock
//!   Valet.sock                       power.sock
//! ```
//!
//! - [`SocketServiceRegistry`] / [`SocketHardwareRegistry`] enumerate and
//!   probe those directories
//! - [`SocketService`] is the transport client the registries hand out
//! - [`DumpServer`] lets any [`Dumpable`](dumpsys_core::Dumpable) answer requests

pub mod config;
pub mod error;
pub mod handle;
pub mod protocol;
pub mod registry;
pub mod server;

use std::sync::Arc;

pub use config::{SocketRegistryConfig, DEFAULT_HARDWARE_DIR, DEFAULT_SERVICES_DIR};
pub use error::{ServerError, ServerResult};
pub use handle::SocketService;
pub use protocol::{is_plain_name, socket_path, DumpRequest, SOCKET_EXTENSION};
pub use registry::{scan_dir, SocketHardwareRegistry, SocketServiceRegistry};
pub use server::DumpServer;

/// Both registries for `config`, ready to hand to the orchestrator
pub fn registries(
    config: &SocketRegistryConfig,
) -> (Arc<SocketServiceRegistry>, Arc<SocketHardwareRegistry>) {
    (
        Arc::new(SocketServiceRegistry::from_config(config)),
        Arc::new(SocketHardwareRegistry::from_config(config)),
    )
}
