use async_trait::async_trait;
use autopost_common::auth::oauth1::{build_authorization_header, SigningCredentials};
use autopost_core::Publisher;
use autopost_domain::constants::DEFAULT_PUBLISH_ENDPOINT;
use autopost_domain::{AutopostError, Credentials, PublishedPost, Result, RetryPolicy};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tracing::{debug, info, instrument};

use super::types::{CreatePostRequest, CreatePostResponse};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Publisher for the X API v2 create-post endpoint
pub struct XPublisher {
    http_client: HttpClient,
    endpoint: String,
    retry_policy: RetryPolicy,
}

impl XPublisher {
    /// Publisher posting to the default endpoint with the client's retry policy.
    pub fn new(http_client: HttpClient) -> Self {
        let retry_policy = http_client.retry_policy();
        Self { http_client, endpoint: DEFAULT_PUBLISH_ENDPOINT.to_string(), retry_policy }
    }

    /// Override the publish endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Retry policy for publish requests.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Endpoint posts are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for XPublisher {
    #[instrument(skip(self, text, credentials), fields(endpoint = %self.endpoint))]
    async fn publish(&self, text: &str, credentials: &Credentials) -> Result<PublishedPost> {
        // Never sign with partial credentials
        let missing = credentials.missing_fields();
        if !missing.is_empty() {
            return Err(AutopostError::Config(format!(
                "missing credentials: {}",
                missing.join(", ")
            )));
        }

        let signing = SigningCredentials {
            consumer_key: &credentials.consumer_key,
            consumer_secret: Some(&credentials.consumer_secret),
            token: &credentials.access_token,
            token_secret: Some(&credentials.token_secret),
        };
        let payload = CreatePostRequest { text };

        let response = self
            .http_client
            .execute(
                || {
                    let authorization = build_authorization_header("POST", &self.endpoint, signing);
                    Ok(self
                        .http_client
                        .request(Method::POST, &self.endpoint)
                        .header(AUTHORIZATION, authorization)
                        .header(CONTENT_TYPE, "application/json")
                        .json(&payload))
                },
                self.retry_policy,
            )
            .await?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| AutopostError::from(InfraError::from(err)))?;
        debug!(status = status.as_u16(), bytes = body.len(), "Received publish response");

        let parsed: CreatePostResponse =
            serde_json::from_slice(&body).map_err(|err| AutopostError::from(InfraError::from(err)))?;

        let created = parsed.data.ok_or_else(|| {
            AutopostError::InvalidResponse("publish response has no data object".to_string())
        })?;
        let id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AutopostError::InvalidResponse("publish response has no post id".to_string()))?;

        info!(post_id = %id, "Post published");
        Ok(PublishedPost::new(id, created.text.unwrap_or_else(|| text.to_string())))
    }
}
