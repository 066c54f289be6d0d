//! Dump orchestrator - drives every target to a terminal outcome
//!
//! Targets are processed one at a time, strictly in registry order. Per-target
//! problems (not running, timeout, dump error) are folded into the target's
//! [`DumpOutcome`]; only a failed enumeration aborts a run.

use std::sync::Arc;
use std::time::Duration;

use dumpsys_core::{
    DumpOutcome, HardwareServiceRegistry, RegistryResult, Report, ReportKind, ServiceHandle,
    ServiceName, ServiceRegistry, ServiceReport, SkipSet, TargetSpec,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::directory::{GeneralDirectory, HardwareDirectory, ServiceDirectory};
use crate::invoker::{BoundedInvoker, DumpInvoker, Invocation};

/// Per-service timeout used when the caller does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What membership in the skip-set does to a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Dump as usual; only the summary line is annotated
    #[default]
    Annotate,
    /// Resolve for the summary but do not dump
    Suppress,
}

/// Run-wide settings, read-only for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Applied uniformly to every dump
    pub timeout: Duration,
    pub skip_policy: SkipPolicy,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            skip_policy: SkipPolicy::default(),
        }
    }
}

/// The dump orchestrator
///
/// Depends only on the two directories and the invoker, all behind traits,
/// so the whole algorithm runs against in-memory collaborators in tests.
pub struct Dumpsys {
    services: Arc<dyn ServiceDirectory>,
    hardware: Arc<dyn ServiceDirectory>,
    invoker: Arc<dyn DumpInvoker>,
    options: DumpOptions,
}

impl Dumpsys {
    /// Create an orchestrator over the two registries with default settings
    pub fn new(
        services: Arc<dyn ServiceRegistry>,
        hardware: Arc<dyn HardwareServiceRegistry>,
    ) -> Self {
        Self::with_directories(
            Arc::new(GeneralDirectory::new(services)),
            Arc::new(HardwareDirectory::new(hardware)),
            Arc::new(BoundedInvoker::new()),
            DumpOptions::default(),
        )
    }

    /// Create an orchestrator from already adapted collaborators
    pub fn with_directories(
        services: Arc<dyn ServiceDirectory>,
        hardware: Arc<dyn ServiceDirectory>,
        invoker: Arc<dyn DumpInvoker>,
        options: DumpOptions,
    ) -> Self {
        Self {
            services,
            hardware,
            invoker,
            options,
        }
    }

    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn DumpInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Drive every target of `target` to an outcome.
    ///
    /// Fails only when the registry the target reads from cannot be listed.
    pub async fn run(&self, target: &TargetSpec) -> RegistryResult<Report> {
        match target {
            TargetSpec::AllServices => self.dump_all(&SkipSet::new()).await,
            TargetSpec::FilteredAll { skip } => self.dump_all(skip).await,
            TargetSpec::ListServices { skip } => self.list_services(skip).await,
            TargetSpec::AllHardwareServices => self.list_hardware().await,
            TargetSpec::SingleService { name, args } => Ok(self.dump_single(name, args).await),
        }
    }

    async fn dump_all(&self, skip: &SkipSet) -> RegistryResult<Report> {
        let names = self.services.list().await?;
        info!(
            count = names.len(),
            skipped = skip.len(),
            timeout_s = self.options.timeout.as_secs(),
            "Dumping services"
        );

        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            let skipped = skip.contains(&name);
            let outcome = match self.resolve(&name).await {
                None => DumpOutcome::NotRunning,
                Some(_) if skipped && self.options.skip_policy == SkipPolicy::Suppress => {
                    debug!(service = %name, "Dump suppressed by skip policy");
                    DumpOutcome::Skipped
                }
                Some(handle) => self.dump_handle(&name, handle, &[]).await,
            };
            reports.push(ServiceReport {
                name,
                skipped,
                outcome,
            });
        }

        Ok(self.report(ReportKind::Dump, reports))
    }

    async fn list_services(&self, skip: &SkipSet) -> RegistryResult<Report> {
        let names = self.services.list().await?;

        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            let outcome = match self.resolve(&name).await {
                Some(_) => DumpOutcome::Listed,
                None => DumpOutcome::NotRunning,
            };
            reports.push(ServiceReport {
                skipped: skip.contains(&name),
                name,
                outcome,
            });
        }

        Ok(self.report(ReportKind::List, reports))
    }

    async fn list_hardware(&self) -> RegistryResult<Report> {
        let names = self.hardware.list().await?;
        info!(count = names.len(), "Listing hardware services");

        let reports = names
            .into_iter()
            .map(|name| ServiceReport::new(name, DumpOutcome::Listed))
            .collect();

        Ok(self.report(ReportKind::HardwareList, reports))
    }

    async fn dump_single(&self, name: &ServiceName, args: &[String]) -> Report {
        let outcome = match self.resolve(name).await {
            Some(handle) => self.dump_handle(name, handle, args).await,
            None => DumpOutcome::NotRunning,
        };

        self.report(
            ReportKind::Single,
            vec![ServiceReport::new(name.clone(), outcome)],
        )
    }

    async fn resolve(&self, name: &ServiceName) -> Option<ServiceHandle> {
        let handle = self.services.resolve(name).await;
        if handle.is_none() {
            debug!(service = %name, "Service not running");
        }
        handle
    }

    async fn dump_handle(
        &self,
        name: &ServiceName,
        handle: ServiceHandle,
        args: &[String],
    ) -> DumpOutcome {
        debug!(service = %name, args = args.len(), "Invoking dump");

        match self
            .invoker
            .invoke(handle, args, self.options.timeout)
            .await
        {
            Invocation::Completed { text, elapsed } => {
                debug!(
                    service = %name,
                    bytes = text.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Dump completed"
                );
                DumpOutcome::Dumped { text, elapsed }
            }
            Invocation::TimedOut { elapsed } => {
                warn!(
                    service = %name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Dump timed out"
                );
                DumpOutcome::TimedOut { elapsed }
            }
            Invocation::Failed { error, .. } if error.is_dead_object() => {
                debug!(service = %name, "Service died before its dump");
                DumpOutcome::NotRunning
            }
            Invocation::Failed {
                text,
                elapsed,
                error,
            } => {
                warn!(
                    service = %name,
                    error = %error,
                    partial_bytes = text.len(),
                    "Dump failed"
                );
                DumpOutcome::Failed {
                    text,
                    elapsed,
                    reason: error.to_string(),
                }
            }
        }
    }

    fn report(&self, kind: ReportKind, services: Vec<ServiceReport>) -> Report {
        Report::new(kind, self.options.timeout, services)
    }
}
