//! Shared data models for dumpsys

mod name;
mod outcome;
mod report;
mod target;

pub use name::*;
pub use outcome::*;
pub use report::*;
pub use target::*;
