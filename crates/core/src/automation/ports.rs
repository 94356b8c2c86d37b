//! Port interfaces for the automation cycle

use async_trait::async_trait;
use autopost_domain::{Credentials, CycleState, PublishedPost, Result};
use uuid::Uuid;

/// Produces post text from a prompt.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate raw text for `prompt`. Blank output is handled by the caller.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Publishes text to the social-media endpoint.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text` signed with `credentials`.
    ///
    /// Implementations sign every attempt afresh and surface
    /// [`autopost_domain::AutopostError::Rejected`] or
    /// [`autopost_domain::AutopostError::RetriesExhausted`] on failure.
    async fn publish(&self, text: &str, credentials: &Credentials) -> Result<PublishedPost>;
}

/// Interactive fallback offered after a failed manual publish.
#[async_trait]
pub trait ManualPublishFallback: Send + Sync {
    async fn offer_manual_publish(&self, text: &str) -> Result<()>;
}

/// Snapshot of the values a cycle needs, read once at the start of each cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationSettings {
    pub topics: Vec<String>,
    pub credentials: Credentials,
}

/// Source of the current topics and credentials.
///
/// Changes made between cycles are picked up by the next cycle.
pub trait SettingsSource: Send + Sync {
    fn snapshot(&self) -> AutomationSettings;
}

/// Injectable randomness for topic selection.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn pick_index(&self, len: usize) -> usize;
}

/// Receives every state transition of a cycle.
pub trait CycleObserver: Send + Sync {
    /// `message` is a human-readable log line describing the transition.
    fn on_state_change(&self, cycle_id: Uuid, state: CycleState, message: &str);
}
