//! End-to-end tests for dumpsys
//!
//! The tests in `tests/` run the orchestrator against the socket registries,
//! with every service served by a real [`DumpServer`](dumpsys_socket::DumpServer)
//! in a temporary registry directory. No external setup is needed:
//!
//! ```bash
//! cargo test -p dumpsys-tests
//! ```

// This crate only contains tests, no library code
