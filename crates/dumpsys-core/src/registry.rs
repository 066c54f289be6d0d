//! Collaborator traits - the registries and the services they hand out

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DumpResult, RegistryResult};
use crate::models::ServiceName;
use crate::sink::DumpSink;

/// Reference to a live, callable service.
///
/// A handle can go stale between lookup and use; a dump on a stale handle
/// reports [`DumpError::DeadObject`](crate::DumpError::DeadObject).
pub type ServiceHandle = Arc<dyn Dumpable>;

/// Callback a hardware registry calls with its listing, or with the reason
/// the listing could not be produced
pub type ListCallback = Box<dyn FnOnce(RegistryResult<Vec<ServiceName>>) + Send + 'static>;

/// A service that can write a human-readable diagnostic dump.
///
/// The service writes into `sink` and returns once it is done; dropping the
/// sink marks the end of the dump. Implementations must tolerate the sink
/// failing mid-dump: the reader may have given up on them.
#[async_trait]
pub trait Dumpable: Send + Sync {
    /// Write diagnostic text into `sink`, honoring `args`
    async fn dump(&self, sink: DumpSink, args: &[String]) -> DumpResult<()>;
}

/// The general service registry
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Enumerate registered services, in the registry's own order
    async fn list_services(&self) -> RegistryResult<Vec<ServiceName>>;

    /// Look up a live handle; `None` means registered but not running
    async fn check_service(&self, name: &ServiceName) -> Option<ServiceHandle>;
}

/// The hardware service registry
///
/// Listing is callback based: the registry calls `callback` once with the
/// full listing (or the error that prevented it), possibly from another
/// thread and possibly after `list` has returned.
#[async_trait]
pub trait HardwareServiceRegistry: Send + Sync {
    /// Request the listing; an `Err` means `callback` will never run
    fn list(&self, callback: ListCallback) -> RegistryResult<()>;

    /// Look up a live handle for a hardware service
    async fn get(&self, name: &ServiceName) -> Option<ServiceHandle>;
}
