//! Scheduling infrastructure for the automation cycle
//!
//! The scheduler follows explicit runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned timer tasks
//! - Cancellation token support
//! - Timeout wrapping when awaiting task shutdown
//! - Structured tracing on every lifecycle transition

pub mod cycle_scheduler;
pub mod error;

pub use cycle_scheduler::{CycleJob, CycleScheduler, CycleSchedulerConfig, ScheduleStatus};
pub use error::{SchedulerError, SchedulerResult};
