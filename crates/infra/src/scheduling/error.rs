//! Scheduler error types

use autopost_domain::AutopostError;
use thiserror::Error;
use tokio::task::JoinError;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running; no second timer is armed
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Manual runs are only allowed while the scheduler is stopped
    #[error("Manual run rejected while the schedule is active")]
    ManualRunWhileScheduled,

    /// A cycle is still generating or posting
    #[error("A cycle is already in progress")]
    CycleInProgress,

    /// Operation timed out
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<JoinError> for SchedulerError {
    fn from(err: JoinError) -> Self {
        SchedulerError::TaskJoinFailed(err.to_string())
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        InfraError(AutopostError::Internal(err.to_string()))
    }
}

impl From<SchedulerError> for AutopostError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
