//! Example service for dumpsys
//!
//! A minimal [`Dumpable`](dumpsys_core::Dumpable) used to demo dumpsys
//! against real sockets.

mod status;

pub use status::StatusService;
