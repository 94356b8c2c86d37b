//! Pure utilities shared across Autopost crates.
//!
//! Nothing in this crate performs I/O or spawns tasks.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: request signing and time formatting

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;
#[cfg(feature = "foundation")]
pub mod time;

#[cfg(feature = "foundation")]
pub use auth::oauth1::{OAuthParams, SigningCredentials};
#[cfg(feature = "foundation")]
pub use time::format::{format_duration, format_remaining};
