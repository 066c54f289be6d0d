//! Directory-backed service registries
//!
//! A registry directory holds one `<name>.sock` Unix socket per registered
//! service. A service is running when its socket accepts a connection;
//! a leftover socket file with nobody listening is registered-but-stopped.

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dumpsys_core::{
    HardwareServiceRegistry, ListCallback, RegistryError, RegistryResult, ServiceHandle,
    ServiceName, ServiceRegistry,
};
use tracing::{debug, warn};

use crate::config::SocketRegistryConfig;
use crate::handle::{probe, SocketService};
use crate::protocol::{is_plain_name, service_name, socket_path};

/// Registered services in `dir`, in byte-lexicographic order
pub fn scan_dir(dir: &Path) -> RegistryResult<Vec<ServiceName>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| RegistryError::Unavailable(format!("{}: {}", dir.display(), e)))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| RegistryError::Unavailable(format!("{}: {}", dir.display(), e)))?;
        let is_socket = entry
            .file_type()
            .map(|file_type| file_type.is_socket())
            .unwrap_or(false);
        if !is_socket {
            continue;
        }
        if let Some(name) = service_name(&entry.path()) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| a.as_str().as_bytes().cmp(b.as_str().as_bytes()));
    Ok(names)
}

/// Shared lookup: probe the socket and hand out a transport handle
async fn lookup(
    dir: &Path,
    name: &ServiceName,
    connect_timeout: Duration,
) -> Option<ServiceHandle> {
    if !is_plain_name(name) {
        debug!(service = %name, "Name does not denote a registry entry");
        return None;
    }

    let path = socket_path(dir, name);
    if !probe(&path, connect_timeout).await {
        debug!(service = %name, path = %path.display(), "Socket not accepting connections");
        return None;
    }
    Some(Arc::new(SocketService::new(name.clone(), path, connect_timeout)))
}

// =============================================================================
// General registry
// =============================================================================

/// General service registry over a socket directory
#[derive(Debug, Clone)]
pub struct SocketServiceRegistry {
    dir: PathBuf,
    connect_timeout: Duration,
}

impl SocketServiceRegistry {
    pub fn new(dir: impl Into<PathBuf>, connect_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &SocketRegistryConfig) -> Self {
        Self::new(config.services_dir.clone(), config.connect_timeout())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ServiceRegistry for SocketServiceRegistry {
    async fn list_services(&self) -> RegistryResult<Vec<ServiceName>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || scan_dir(&dir))
            .await
            .map_err(|e| RegistryError::Unavailable(format!("directory scan failed: {}", e)))?
    }

    async fn check_service(&self, name: &ServiceName) -> Option<ServiceHandle> {
        lookup(&self.dir, name, self.connect_timeout).await
    }
}

// =============================================================================
// Hardware registry
// =============================================================================

/// Scan `dir` and hand the outcome, success or not, to `callback`
fn deliver_listing(dir: &Path, callback: ListCallback) {
    let listing = scan_dir(dir);
    if let Err(err) = &listing {
        warn!(error = %err, "Hardware listing failed");
    }
    callback(listing);
}

/// Hardware service registry over a socket directory
///
/// Listing runs on a dedicated thread and reports through the callback,
/// after `list` has already returned.
#[derive(Debug, Clone)]
pub struct SocketHardwareRegistry {
    dir: PathBuf,
    connect_timeout: Duration,
}

impl SocketHardwareRegistry {
    pub fn new(dir: impl Into<PathBuf>, connect_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &SocketRegistryConfig) -> Self {
        Self::new(config.hardware_dir.clone(), config.connect_timeout())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl HardwareServiceRegistry for SocketHardwareRegistry {
    fn list(&self, callback: ListCallback) -> RegistryResult<()> {
        if !self.dir.is_dir() {
            return Err(RegistryError::Unavailable(format!(
                "{}: not a directory",
                self.dir.display()
            )));
        }

        let dir = self.dir.clone();
        std::thread::Builder::new()
            .name("dumpsys-hw-list".to_string())
            .spawn(move || deliver_listing(&dir, callback))
            .map_err(|e| RegistryError::Unavailable(format!("listing thread: {}", e)))?;

        Ok(())
    }

    async fn get(&self, name: &ServiceName) -> Option<ServiceHandle> {
        lookup(&self.dir, name, self.connect_timeout).await
    }
}
