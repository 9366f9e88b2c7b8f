//! Coordination layer
//!
//! Lifecycle ownership for the periodic clock and feed jobs.

pub mod scheduler;

pub use scheduler::{JobGuard, Scheduler, TaskHandle};
