//! Time utilities
//!
//! - **[`format`]**: Human-readable duration formatting

pub mod format;

pub use format::{format_duration, format_remaining};
