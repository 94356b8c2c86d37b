//! # Autopost App
//!
//! Composition root and command line entry point.
//!
//! This crate contains:
//! - Command line parsing
//! - Application context (dependency injection)
//! - Logging setup and readiness checks
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod cli;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use cli::{Cli, Command};
pub use context::*;
