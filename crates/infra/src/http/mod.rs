//! Outbound HTTP with timeout and retry classification

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
