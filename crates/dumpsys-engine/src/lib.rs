//! dumpsys-engine - Bounded dump orchestration over service registries
//!
//! This crate decides which services to query, in what order and under what
//! deadline, and turns the per-service results into dumpsys text.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Dumpsys                               │
//! │  - Expands a TargetSpec into targets, in registry order          │
//! │  - Drives each target to exactly one DumpOutcome                 │
//! │  - Only a failed enumeration aborts the run                      │
//! └───────────────┬───────────────────────────────┬──────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐  ┌───────────────────────────────┐
//! │       ServiceDirectory        │  │        BoundedInvoker         │
//! │  GeneralDirectory             │  │  detached task + private pipe │
//! │  HardwareDirectory (callback) │  │  raced against the timeout    │
//! └───────────────────────────────┘  └───────────────────────────────┘
//!                 │
//!                 ▼
//!          Report ──► Renderer ──► stdout / stderr
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use dumpsys_engine::{DumpOptions, Dumpsys, Renderer};
//!
//! let dumpsys = Dumpsys::new(services, hardware).with_options(DumpOptions::default());
//! let report = dumpsys.run(&TargetSpec::AllServices).await?;
//!
//! Renderer::new(std::io::stdout().lock(), std::io::stderr().lock()).render(&report)?;
//! ```

pub mod directory;
pub mod invoker;
pub mod orchestrator;
pub mod report;

pub use directory::{GeneralDirectory, HardwareDirectory, ServiceDirectory};
pub use invoker::{BoundedInvoker, DumpInvoker, Invocation, DEFAULT_PIPE_CAPACITY};
pub use orchestrator::{DumpOptions, Dumpsys, SkipPolicy, DEFAULT_TIMEOUT};
pub use report::Renderer;

// Re-export core types for convenience
pub use dumpsys_core::{DumpOutcome, RegistryError, Report, ReportKind, SkipSet, TargetSpec};
