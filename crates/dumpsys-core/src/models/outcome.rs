//! Per-service dump outcome

use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;

/// Terminal state of one target.
///
/// # Lifecycle
///
/// ```text
/// Pending → Resolving ─┬─► NotRunning
///                      ├─► Listed            (listing only)
///                      ├─► Skipped           (SkipPolicy::Suppress)
///                      └─► Invoking ─┬─► Dumped
///                                    ├─► TimedOut
///                                    └─► Failed
/// ```
///
/// Every target ends in exactly one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpOutcome {
    /// Service wrote its dump before the deadline
    Dumped {
        /// Everything the service wrote, in order
        text: Bytes,
        /// Wall-clock time spent on the dump
        elapsed: Duration,
    },
    /// Service resolved; listing mode does not dump
    Listed,
    /// Registry has no live handle for the name
    NotRunning,
    /// Service resolved but its dump was suppressed by the skip policy
    Skipped,
    /// Deadline elapsed before the service finished
    TimedOut { elapsed: Duration },
    /// Service reported an error while dumping
    Failed {
        /// Whatever the service wrote before the error
        text: Bytes,
        elapsed: Duration,
        reason: String,
    },
}

impl DumpOutcome {
    /// Whether the service was reachable when it was resolved
    pub fn is_running(&self) -> bool {
        !matches!(self, DumpOutcome::NotRunning)
    }

    /// Captured text, lossily decoded; a failed dump may carry partial text
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            DumpOutcome::Dumped { text, .. } | DumpOutcome::Failed { text, .. } => {
                Some(String::from_utf8_lossy(text))
            }
            _ => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            DumpOutcome::Dumped { .. } => "dumped",
            DumpOutcome::Listed => "listed",
            DumpOutcome::NotRunning => "not_running",
            DumpOutcome::Skipped => "skipped",
            DumpOutcome::TimedOut { .. } => "timed_out",
            DumpOutcome::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for DumpOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
