use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PublishedPost;
use crate::AutopostError;

/// Status of the automation cycle as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Generating,
    Posting,
    /// Scheduled cycle finished; waiting for the next firing.
    Waiting,
    /// Manual cycle finished.
    Success,
    Error,
}

impl CycleState {
    /// Generating or posting.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Generating | Self::Posting)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Waiting | Self::Success | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Posting => "posting",
            Self::Waiting => "waiting",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a cycle was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    Scheduled,
    Manual,
}

impl CycleMode {
    /// State a successful cycle ends in.
    pub fn success_state(self) -> CycleState {
        match self {
            Self::Scheduled => CycleState::Waiting,
            Self::Manual => CycleState::Success,
        }
    }

    pub fn allows_fallback(self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// Outcome of one pick-topic, generate, publish cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub mode: CycleMode,
    pub topic: Option<String>,
    pub text: Option<String>,
    pub post: Option<PublishedPost>,
    pub final_state: CycleState,
    pub error: Option<AutopostError>,
    pub fallback_offered: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CycleReport {
    /// Fresh report for a cycle that has just begun.
    pub fn begin(mode: CycleMode) -> Self {
        let now = Utc::now();
        Self {
            cycle_id: Uuid::new_v4(),
            mode,
            topic: None,
            text: None,
            post: None,
            final_state: CycleState::Idle,
            error: None,
            fallback_offered: false,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.post.is_some()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
