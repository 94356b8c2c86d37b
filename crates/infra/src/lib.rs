//! # Autopost Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The retrying HTTP client
//! - External service integrations (X publishing, OpenAI-compatible
//!   generation, share-intent fallback)
//! - The interval scheduler for automation cycles
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `autopost-core`
//! - Depends on `autopost-common` and `autopost-core`
//! - Contains all "impure" code (network, timers, files, processes)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::{OpenAiGenerator, ShareIntentFallback, XPublisher};
pub use scheduling::{
    CycleJob, CycleScheduler, CycleSchedulerConfig, ScheduleStatus, SchedulerError,
    SchedulerResult,
};
