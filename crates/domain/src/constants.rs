//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Scheduling
pub const DEFAULT_INTERVAL_MINUTES: u64 = 40;
pub const COUNTDOWN_TICK_SECS: u64 = 1;

// Retry policy defaults (delays of 2s then 4s)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// Topics
pub const MAX_TOPICS: usize = 10;

// Post text
pub const MAX_POST_CHARS: usize = 280;
pub const POST_TRUNCATE_SUFFIX: &str = "…";

// Endpoints
pub const DEFAULT_PUBLISH_ENDPOINT: &str = "https://api.twitter.com/2/tweets";
pub const DEFAULT_SHARE_INTENT_URL: &str = "https://twitter.com/intent/tweet";
pub const DEFAULT_GENERATION_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Prompt sent to the generation capability; `{topic}` is replaced with the
/// selected topic.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Write one engaging social media post about {topic}. \
Keep it under 280 characters, use a natural tone, include at most two hashtags, \
and reply with the post text only.";
