//! In-memory settings and randomness implementations

use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;

use super::ports::{AutomationSettings, RandomSource, SettingsSource};

/// Settings held in memory and replaceable at runtime.
///
/// Cloning shares the underlying value, so a clone handed to the cycle sees
/// updates made through any other clone.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<AutomationSettings>>,
}

impl SharedSettings {
    pub fn new(settings: AutomationSettings) -> Self {
        Self { inner: Arc::new(RwLock::new(settings)) }
    }

    /// Replace the topic list.
    pub fn set_topics(&self, topics: Vec<String>) {
        self.inner.write().topics = topics;
    }

    /// Replace all settings at once.
    pub fn replace(&self, settings: AutomationSettings) {
        *self.inner.write() = settings;
    }
}

impl SettingsSource for SharedSettings {
    fn snapshot(&self) -> AutomationSettings {
        self.inner.read().clone()
    }
}

/// Uniform choice backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index (clamped to the list length).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick_index(&self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}
