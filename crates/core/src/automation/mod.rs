//! Automation cycle: ports and the service that drives one cycle

pub mod ports;
pub mod service;
pub mod settings;

pub use service::{build_prompt, normalize_post_text, AutomationCycle};
pub use settings::{FixedRandom, SharedSettings, ThreadRandom};
