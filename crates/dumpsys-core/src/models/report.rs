//! Report models - the ordered result of one run

use std::time::Duration;

use super::{DumpOutcome, ServiceName};

/// Outcome for a single target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    /// Target name
    pub name: ServiceName,
    /// Whether the name was in the active skip-set
    pub skipped: bool,
    /// Terminal state reached
    pub outcome: DumpOutcome,
}

impl ServiceReport {
    pub fn new(name: ServiceName, outcome: DumpOutcome) -> Self {
        Self {
            name,
            skipped: false,
            outcome,
        }
    }
}

/// Which kind of run produced a report; selects the rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Summary plus one dump block per running service
    Dump,
    /// Summary of general services only
    List,
    /// Summary of hardware services only
    HardwareList,
    /// Raw output of one named service
    Single,
}

/// All outcomes of one run, in target order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    /// Per-service timeout the run was configured with
    pub timeout: Duration,
    pub services: Vec<ServiceReport>,
}

impl Report {
    pub fn new(kind: ReportKind, timeout: Duration, services: Vec<ServiceReport>) -> Self {
        Self {
            kind,
            timeout,
            services,
        }
    }

    /// Targets that resolved, in target order
    pub fn running(&self) -> impl Iterator<Item = &ServiceReport> {
        self.services.iter().filter(|s| s.outcome.is_running())
    }

    /// Targets with no live handle, in target order
    pub fn not_running(&self) -> impl Iterator<Item = &ServiceReport> {
        self.services.iter().filter(|s| !s.outcome.is_running())
    }

    /// Look up the outcome recorded for `name`
    pub fn get(&self, name: &str) -> Option<&DumpOutcome> {
        self.services
            .iter()
            .find(|s| s.name.as_str() == name)
            .map(|s| &s.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_and_not_running_partition() {
        let report = Report::new(
            ReportKind::List,
            Duration::from_secs(10),
            vec![
                ServiceReport::new("Locksmith".into(), DumpOutcome::Listed),
                ServiceReport::new("Valet".into(), DumpOutcome::NotRunning),
            ],
        );

        let running: Vec<&str> = report.running().map(|s| s.name.as_str()).collect();
        let stopped: Vec<&str> = report.not_running().map(|s| s.name.as_str()).collect();
        assert_eq!(running, vec!["Locksmith"]);
        assert_eq!(stopped, vec!["Valet"]);
        assert_eq!(report.get("Valet"), Some(&DumpOutcome::NotRunning));
        assert!(report.get("Butler").is_none());
    }
}
