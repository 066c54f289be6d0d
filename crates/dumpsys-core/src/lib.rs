//! dumpsys-core - Core traits and types for dumpsys
//!
//! This crate provides the abstractions the dump orchestrator is written
//! against. A platform plugs in by implementing:
//! - [`ServiceRegistry`] - the general service namespace (enumerate, look up)
//! - [`HardwareServiceRegistry`] - the hardware namespace (callback listing)
//! - [`Dumpable`] - a live service that writes diagnostic text into a [`DumpSink`]
//!
//! The [`testing`] module carries scriptable in-memory versions of all three.

pub mod error;
pub mod models;
pub mod registry;
pub mod sink;
pub mod testing;

pub use error::{DumpError, DumpResult, RegistryError, RegistryResult};
pub use models::*;
pub use registry::{
    Dumpable, HardwareServiceRegistry, ListCallback, ServiceHandle, ServiceRegistry,
};
pub use sink::{dump_pipe, DumpSink, DumpSource};
