//! Service directory adapter
//!
//! Puts the general and hardware registries behind one enumerate/resolve
//! interface, so the orchestrator never sees registry-specific calling
//! conventions.

use std::sync::Arc;

use async_trait::async_trait;
use dumpsys_core::{
    HardwareServiceRegistry, Namespace, RegistryError, RegistryResult, ServiceHandle,
    ServiceName, ServiceRegistry,
};
use tokio::sync::oneshot;
use tracing::debug;

/// Uniform view of one registry namespace
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    /// Namespace this directory serves
    fn namespace(&self) -> Namespace;

    /// Names in the order the registry reports them; never sorted or deduplicated
    async fn list(&self) -> RegistryResult<Vec<ServiceName>>;

    /// Live handle for `name`; `None` means registered but not running
    async fn resolve(&self, name: &ServiceName) -> Option<ServiceHandle>;
}

/// Directory over the general service registry
pub struct GeneralDirectory {
    registry: Arc<dyn ServiceRegistry>,
}

impl GeneralDirectory {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ServiceDirectory for GeneralDirectory {
    fn namespace(&self) -> Namespace {
        Namespace::General
    }

    async fn list(&self) -> RegistryResult<Vec<ServiceName>> {
        let names = self.registry.list_services().await?;
        debug!(count = names.len(), "Listed general services");
        Ok(names)
    }

    async fn resolve(&self, name: &ServiceName) -> Option<ServiceHandle> {
        self.registry.check_service(name).await
    }
}

/// Directory over the callback-based hardware registry
pub struct HardwareDirectory {
    registry: Arc<dyn HardwareServiceRegistry>,
}

impl HardwareDirectory {
    pub fn new(registry: Arc<dyn HardwareServiceRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ServiceDirectory for HardwareDirectory {
    fn namespace(&self) -> Namespace {
        Namespace::Hardware
    }

    async fn list(&self) -> RegistryResult<Vec<ServiceName>> {
        let (tx, rx) = oneshot::channel();
        self.registry
            .list(Box::new(move |listing: RegistryResult<Vec<ServiceName>>| {
                // Receiver only disappears if the caller was cancelled
                let _ = tx.send(listing);
            }))?;

        let names = rx.await.map_err(|_| RegistryError::ListingDropped)??;
        debug!(count = names.len(), "Listed hardware services");
        Ok(names)
    }

    async fn resolve(&self, name: &ServiceName) -> Option<ServiceHandle> {
        self.registry.get(name).await
    }
}
