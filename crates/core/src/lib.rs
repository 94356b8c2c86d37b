//! # Autopost Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The automation cycle service
//!
//! ## Architecture Principles
//! - Only depends on `autopost-domain`
//! - No HTTP, timers, or platform code
//! - All external dependencies via traits

pub mod automation;

pub use automation::ports::{
    AutomationSettings, ContentGenerator, CycleObserver, ManualPublishFallback, Publisher,
    RandomSource, SettingsSource,
};
pub use automation::{AutomationCycle, FixedRandom, SharedSettings, ThreadRandom};
