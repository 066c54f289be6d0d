//! Test utilities for dumpsys
//!
//! Scriptable in-memory registries and services, so the orchestrator can be
//! exercised without a real service environment.
//!
//! ```ignore
//! let sm = MockServiceManager::new();
//! sm.expect_list(["running1", "stopped2"]);
//! sm.expect_dump("running1", "dump1");
//! sm.expect_stopped("stopped2");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::{DumpError, DumpResult, RegistryError, RegistryResult};
use crate::models::ServiceName;
use crate::registry::{
    Dumpable, HardwareServiceRegistry, ListCallback, ServiceHandle, ServiceRegistry,
};
use crate::sink::DumpSink;

// =============================================================================
// Mock Service
// =============================================================================

/// A service that writes scripted output
pub struct MockService {
    output: String,
    /// Sleep before writing anything
    delay: Duration,
    /// Error returned once the output is written
    error: Option<DumpError>,
    calls: Mutex<Vec<Vec<String>>>,
    completed: AtomicUsize,
    write_failures: AtomicUsize,
}

impl MockService {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            delay: Duration::ZERO,
            error: None,
            calls: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            write_failures: AtomicUsize::new(0),
        }
    }

    /// Hang for `delay` before writing
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Write the output, then fail with `error`
    pub fn with_error(mut self, error: DumpError) -> Self {
        self.error = Some(error);
        self
    }

    /// Fail every dump with `error` without writing anything
    pub fn failing(error: DumpError) -> Self {
        Self::new("").with_error(error)
    }

    /// Argument lists of every dump call so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Dumps that ran to completion, successfully or not
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Dumps whose write was rejected because the reader had gone away
    pub fn write_failures(&self) -> usize {
        self.write_failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dumpable for MockService {
    async fn dump(&self, mut sink: DumpSink, args: &[String]) -> DumpResult<()> {
        self.calls.lock().push(args.to_vec());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match sink.write(&self.output).await {
            Ok(()) => self.error.clone().map_or(Ok(()), Err),
            Err(err) => Err(err),
        };
        if matches!(result, Err(DumpError::Io(_))) {
            self.write_failures.fetch_add(1, Ordering::SeqCst);
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

// =============================================================================
// Mock Service Manager
// =============================================================================

/// In-memory general service registry
#[derive(Default)]
pub struct MockServiceManager {
    listing: RwLock<Vec<ServiceName>>,
    services: RwLock<HashMap<ServiceName, Arc<MockService>>>,
    unavailable: AtomicBool,
    list_calls: AtomicUsize,
    checked: Mutex<Vec<ServiceName>>,
}

impl MockServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the names `list_services` reports, in order
    pub fn expect_list<I, N>(&self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<ServiceName>,
    {
        *self.listing.write() = names.into_iter().map(Into::into).collect();
    }

    /// Make `name` resolvable with `service`
    pub fn add_service(&self, name: &str, service: MockService) -> Arc<MockService> {
        let service = Arc::new(service);
        self.services
            .write()
            .insert(ServiceName::from(name), service.clone());
        service
    }

    /// Make `name` resolvable, dumping `output`
    pub fn expect_dump(&self, name: &str, output: &str) -> Arc<MockService> {
        self.add_service(name, MockService::new(output))
    }

    /// Make `name` unresolvable
    pub fn expect_stopped(&self, name: &str) {
        self.services.write().remove(name);
    }

    /// Make `list_services` fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Names passed to `check_service`, in call order
    pub fn checked(&self) -> Vec<ServiceName> {
        self.checked.lock().clone()
    }
}

#[async_trait]
impl ServiceRegistry for MockServiceManager {
    async fn list_services(&self) -> RegistryResult<Vec<ServiceName>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable(
                "mock service manager offline".to_string(),
            ));
        }
        Ok(self.listing.read().clone())
    }

    async fn check_service(&self, name: &ServiceName) -> Option<ServiceHandle> {
        self.checked.lock().push(name.clone());
        self.services
            .read()
            .get(name)
            .map(|service| service.clone() as ServiceHandle)
    }
}

// =============================================================================
// Mock Hardware Service Manager
// =============================================================================

/// How the mock hardware registry delivers its listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListDelivery {
    /// Call the callback before `list` returns
    #[default]
    Inline,
    /// Call the callback from a separate thread after `list` returns
    Thread,
    /// Report an error through the callback from a separate thread
    Failed,
    /// Drop the callback without calling it
    Never,
}

/// In-memory hardware service registry
#[derive(Default)]
pub struct MockHardwareServiceManager {
    listing: RwLock<Vec<ServiceName>>,
    services: RwLock<HashMap<ServiceName, Arc<MockService>>>,
    delivery: RwLock<ListDelivery>,
    unavailable: AtomicBool,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MockHardwareServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_list<I, N>(&self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<ServiceName>,
    {
        *self.listing.write() = names.into_iter().map(Into::into).collect();
    }

    pub fn add_service(&self, name: &str, service: MockService) -> Arc<MockService> {
        let service = Arc::new(service);
        self.services
            .write()
            .insert(ServiceName::from(name), service.clone());
        service
    }

    pub fn set_delivery(&self, delivery: ListDelivery) {
        *self.delivery.write() = delivery;
    }

    /// Make `list` fail synchronously
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HardwareServiceRegistry for MockHardwareServiceManager {
    fn list(&self, callback: ListCallback) -> RegistryResult<()> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable(
                "mock hardware service manager offline".to_string(),
            ));
        }

        let names = self.listing.read().clone();
        match *self.delivery.read() {
            ListDelivery::Inline => callback(Ok(names)),
            ListDelivery::Thread => {
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(10));
                    callback(Ok(names));
                });
            }
            ListDelivery::Failed => {
                std::thread::spawn(move || {
                    callback(Err(RegistryError::Unavailable(
                        "mock hardware listing failed".to_string(),
                    )));
                });
            }
            ListDelivery::Never => drop(callback),
        }
        Ok(())
    }

    async fn get(&self, name: &ServiceName) -> Option<ServiceHandle> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.services
            .read()
            .get(name)
            .map(|service| service.clone() as ServiceHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::dump_pipe;

    #[tokio::test]
    async fn test_mock_service_records_args_and_writes_output() {
        let service = MockService::new("I DO!");
        let (sink, mut source) = dump_pipe(64);

        let args = vec!["Y".to_string(), "U".to_string()];
        service.dump(sink, &args).await.unwrap();

        assert_eq!(source.read_all().await.unwrap().as_ref(), b"I DO!");
        assert_eq!(service.calls(), vec![args]);
        assert_eq!(service.completed(), 1);
    }

    #[tokio::test]
    async fn test_mock_service_counts_rejected_writes() {
        let service = MockService::new("too late");
        let (sink, source) = dump_pipe(64);
        drop(source);

        assert!(service.dump(sink, &[]).await.is_err());
        assert_eq!(service.write_failures(), 1);
    }

    #[tokio::test]
    async fn test_mock_service_manager_resolution() {
        let sm = MockServiceManager::new();
        sm.expect_list(["Locksmith", "Valet"]);
        sm.expect_dump("Locksmith", "unlocked");
        sm.expect_stopped("Valet");

        assert_eq!(
            sm.list_services().await.unwrap(),
            vec![ServiceName::from("Locksmith"), ServiceName::from("Valet")]
        );
        assert!(sm.check_service(&"Locksmith".into()).await.is_some());
        assert!(sm.check_service(&"Valet".into()).await.is_none());
        assert_eq!(sm.checked().len(), 2);
    }

    #[test]
    fn test_hardware_listing_never_delivered() {
        let hm = MockHardwareServiceManager::new();
        hm.set_delivery(ListDelivery::Never);

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        hm.list(Box::new(move |_: RegistryResult<Vec<ServiceName>>| {
            flag.store(true, Ordering::SeqCst)
        }))
        .unwrap();

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(hm.list_calls(), 1);
    }
}
