/// OpenAI API client for post generation
use async_trait::async_trait;
use autopost_core::ContentGenerator;
use autopost_domain::config::GenerationConfig;
use autopost_domain::constants::{DEFAULT_GENERATION_API_URL, DEFAULT_GENERATION_MODEL};
use autopost_domain::{AutopostError, Result, RetryPolicy};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, info, instrument};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::errors::InfraError;
use crate::http::HttpClient;

const DEFAULT_MAX_TOKENS: u32 = 120;
const DEFAULT_TEMPERATURE: f32 = 0.9;
const SYSTEM_PROMPT: &str = "You write short, original social media posts. \
Reply with the post text only, without quotes or commentary.";

/// OpenAI API client that turns prompts into post text
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_key: String,
    model: String,
    api_url: String,
    temperature: f32,
    max_tokens: u32,
    retry_policy: RetryPolicy,
}

impl OpenAiGenerator {
    /// Create a new generator
    ///
    /// # Arguments
    /// * `api_key` - API key sent as a bearer token
    /// * `http_client` - HTTP client with retry logic
    pub fn new(api_key: impl Into<String>, http_client: HttpClient) -> Self {
        let retry_policy = http_client.retry_policy();
        Self {
            http_client,
            api_key: api_key.into(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            api_url: DEFAULT_GENERATION_API_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            retry_policy,
        }
    }

    /// Build a generator from configuration.
    pub fn from_config(config: &GenerationConfig, http_client: HttpClient) -> Self {
        Self::new(config.api_key.clone().unwrap_or_default(), http_client)
            .with_model(&config.model)
            .with_api_url(&config.api_url)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at any Chat Completions compatible endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    async fn call_api(&self, prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http_client
            .execute(
                || {
                    Ok(self
                        .http_client
                        .request(Method::POST, &self.api_url)
                        .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
                        .header(CONTENT_TYPE, "application/json")
                        .json(&payload))
                },
                self.retry_policy,
            )
            .await?;

        debug!(status = response.status().as_u16(), "Received generation response");

        let body = response.bytes().await.map_err(|err| AutopostError::from(InfraError::from(err)))?;
        let chat: ChatCompletionResponse =
            serde_json::from_slice(&body).map_err(|err| AutopostError::from(InfraError::from(err)))?;

        if let Some(usage) = &chat.usage {
            debug!(tokens = usage.total_tokens, "Generation token usage");
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AutopostError::NoContent("response contained no choices".to_string()))
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(AutopostError::Config("generation API key is not configured".to_string()));
        }

        let text = self.call_api(prompt).await?;
        info!(chars = text.chars().count(), "Generated content");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_generator(api_url: String) -> OpenAiGenerator {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .retry_policy(RetryPolicy::no_retry())
            .build()
            .expect("http client");

        OpenAiGenerator::new("test-api-key", http_client).with_api_url(api_url)
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "total_tokens": 42 }
        })
    }

    #[tokio::test]
    async fn generates_text_successfully() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.9
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Rust ships fast.")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let generator = test_generator(format!("{}/v1/chat/completions", mock_server.uri()));
        let text = generator.generate("Write about Rust").await.expect("should generate");

        assert_eq!(text, "Rust ships fast.");
        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["messages"][1]["content"], "Write about Rust");
    }

    #[tokio::test]
    async fn authentication_error_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&mock_server)
            .await;

        let generator = test_generator(format!("{}/v1/chat/completions", mock_server.uri()));
        let result = generator.generate("prompt").await;

        assert!(matches!(result, Err(AutopostError::Rejected { status: 401, .. })));
    }

    #[tokio::test]
    async fn empty_choices_is_no_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&mock_server)
            .await;

        let generator = test_generator(mock_server.uri());
        let result = generator.generate("prompt").await;

        assert!(matches!(result, Err(AutopostError::NoContent(_))));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let generator = test_generator(mock_server.uri());
        let result = generator.generate("prompt").await;

        assert!(matches!(result, Err(AutopostError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_request() {
        let mock_server = MockServer::start().await;
        let http_client = HttpClient::builder().build().expect("http client");
        let generator = OpenAiGenerator::new("  ", http_client).with_api_url(mock_server.uri());

        let result = generator.generate("prompt").await;

        assert!(matches!(result, Err(AutopostError::Config(_))));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
