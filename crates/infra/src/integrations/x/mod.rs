//! X (Twitter) API v2 publisher
//!
//! Posts `{"text": ...}` to the create-post endpoint with an OAuth 1.0a
//! user-context signature minted for every attempt.

pub mod client;
pub(crate) mod types;

pub use client::XPublisher;
