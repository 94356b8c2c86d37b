//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GENERATION_API_URL, DEFAULT_GENERATION_MODEL, DEFAULT_INTERVAL_MINUTES,
    DEFAULT_PROMPT_TEMPLATE, DEFAULT_PUBLISH_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHARE_INTENT_URL,
};
use crate::types::{Credentials, RetryPolicy};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub topics: Vec<String>,
    pub credentials: Credentials,
    pub generation: GenerationConfig,
    pub publish: PublishConfig,
    pub schedule: ScheduleConfig,
    pub retry: RetryPolicy,
}

/// Content generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub prompt_template: String,
}

/// Publish endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PublishConfig {
    pub endpoint: String,
    pub share_intent_url: String,
    /// Launch the platform URL opener when the manual fallback fires.
    pub open_browser: bool,
    pub request_timeout_secs: u64,
}

/// Schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GENERATION_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_GENERATION_MODEL.to_string(),
            temperature: 0.9,
            max_tokens: 120,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PUBLISH_ENDPOINT.to_string(),
            share_intent_url: DEFAULT_SHARE_INTENT_URL.to_string(),
            open_browser: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_minutes: DEFAULT_INTERVAL_MINUTES }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            topics: Vec::new(),
            credentials: Credentials::default(),
            generation: GenerationConfig::default(),
            publish: PublishConfig::default(),
            schedule: ScheduleConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Topics with surrounding whitespace removed and blanks dropped.
    pub fn clean_topics(&self) -> Vec<String> {
        self.topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.schedule.interval_minutes, 40);
        assert_eq!(config.publish.endpoint, "https://api.twitter.com/2/tweets");
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.topics.is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            topics = ["rust", "  ", "tokio "]

            [schedule]
            interval_minutes = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.interval_minutes, 15);
        assert_eq!(config.retry.base_delay_ms, 2000);
        assert_eq!(config.clean_topics(), vec!["rust".to_string(), "tokio".to_string()]);
    }

    #[test]
    fn api_key_is_not_serialized() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("sk-secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
