//! OpenAI-compatible content generation
//!
//! Implements the [`autopost_core::ContentGenerator`] port on top of the
//! Chat Completions API.
//!
//! # Usage
//!
//! ```no_run
//! use autopost_core::ContentGenerator;
//! use autopost_infra::http::HttpClient;
//! use autopost_infra::integrations::openai::OpenAiGenerator;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http_client = HttpClient::new()?;
//! let api_key = std::env::var("AUTOPOST_GENERATION_API_KEY")?;
//! let generator = OpenAiGenerator::new(api_key, http_client);
//!
//! let text = generator.generate("Write one post about Rust").await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```
//!
//! # API Integration
//!
//! - Model: `gpt-4o-mini` (configurable via `with_model()`)
//! - Temperature: 0.9 (varied wording between cycles)
//! - Max tokens: 120
//!
//! # Error Handling
//!
//! Requests go through [`crate::http::HttpClient::execute`], so network
//! errors, `5xx` and `429` are retried, and `401`/`403` surface as
//! [`autopost_domain::AutopostError::Rejected`].

pub mod client;
pub(crate) mod types;

pub use client::OpenAiGenerator;
