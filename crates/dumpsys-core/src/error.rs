//! Common error types for registries and dump transports

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for dump operations
pub type DumpResult<T> = Result<T, DumpError>;

/// Errors that can occur while enumerating a service registry
///
/// This is the only failure that can abort a whole run: without a listing
/// there is nothing to dump.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry could not be reached or read
    #[error("Service registry unavailable: {0}")]
    Unavailable(String),

    /// Hardware registry dropped the listing callback without calling it
    #[error("Hardware service registry never delivered a listing")]
    ListingDropped,
}

/// Errors a service can report while writing its dump
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DumpError {
    /// The handle no longer refers to a live service
    #[error("Dead object")]
    DeadObject,

    /// Writing to or reading from the dump destination failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Transport/communication error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DumpError {
    /// Whether the service went away after it was resolved
    pub fn is_dead_object(&self) -> bool {
        matches!(self, DumpError::DeadObject)
    }
}

impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::Io(err.to_string())
    }
}
