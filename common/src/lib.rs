//! Common Utilities and Types Library
//! 
//! This crate provides shared types and utilities used across the GNodeB implementation,
//! including the single-threaded timer and deferred-task facility used by the control plane.

pub mod types;
pub mod utils;
pub mod task_sched;

// Re-export commonly used items
pub use types::*;
pub use utils::*;
pub use task_sched::{TaskScheduler, TimerId};
