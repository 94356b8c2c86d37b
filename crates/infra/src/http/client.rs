use std::time::Duration;

use autopost_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use autopost_domain::{AutopostError, RetryPolicy};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Longest response-body excerpt carried in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// HTTP client with built-in retry and timeout support.
///
/// Requests are described by a closure that is invoked fresh for every
/// attempt, so per-attempt values such as OAuth nonces and signatures are
/// regenerated instead of replayed.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retry_policy: RetryPolicy,
}

/// How a single attempt ended.
enum AttemptOutcome {
    Success(Response),
    Retryable(String),
    Fatal(AutopostError),
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, AutopostError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Retry policy used by [`HttpClient::send`].
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Execute with the client's default retry policy.
    pub async fn send<F>(&self, build: F) -> Result<Response, AutopostError>
    where
        F: Fn() -> Result<RequestBuilder, AutopostError>,
    {
        self.execute(build, self.retry_policy).await
    }

    /// Execute the request produced by `build` with retry semantics.
    ///
    /// - `2xx`: the response is returned for the caller to parse.
    /// - Timeouts, transport failures, `5xx` and `429`: retried after
    ///   `policy.delay_before_attempt(n)` while attempts remain, then
    ///   [`AutopostError::RetriesExhausted`].
    /// - Any other status: [`AutopostError::Rejected`] immediately, carrying
    ///   the status and response body.
    ///
    /// An error returned by `build` aborts without sending anything.
    pub async fn execute<F>(&self, build: F, policy: RetryPolicy) -> Result<Response, AutopostError>
    where
        F: Fn() -> Result<RequestBuilder, AutopostError>,
    {
        let policy = policy.clamped();
        let attempts = policy.max_attempts;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let delay = policy.delay_before_attempt(attempt);
            if !delay.is_zero() {
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %last_error, "retrying HTTP request");
                tokio::time::sleep(delay).await;
            }

            let request = build()?.build().map_err(|err| {
                let infra: InfraError = err.into();
                AutopostError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            match self.attempt(request).await {
                AttemptOutcome::Success(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
                    return Ok(response);
                }
                AttemptOutcome::Fatal(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request rejected");
                    return Err(err);
                }
                AttemptOutcome::Retryable(message) => {
                    debug!(attempt, %method, %url, error = %message, "HTTP attempt failed");
                    last_error = message;
                }
            }
        }

        Err(AutopostError::RetriesExhausted { attempts, last_error })
    }

    async fn attempt(&self, request: reqwest::Request) -> AttemptOutcome {
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let infra: InfraError = err.into();
                return match infra.0 {
                    AutopostError::Transient(message) => AttemptOutcome::Retryable(message),
                    other => AttemptOutcome::Fatal(other),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return AttemptOutcome::Success(response);
        }

        let body = read_error_body(response).await;
        if should_retry_status(status) {
            AttemptOutcome::Retryable(describe_status(status, &body))
        } else {
            let message = if body.is_empty() { describe_status(status, "") } else { body };
            AttemptOutcome::Fatal(AutopostError::Rejected { status: status.as_u16(), message })
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry_policy: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_policy: RetryPolicy::default(),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default retry policy for [`HttpClient::send`].
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy.clamped();
        self
    }

    /// `User-Agent` header sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers added to every request.
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `AutopostError::Internal` if the underlying client cannot be built.
    pub fn build(self) -> Result<HttpClient, AutopostError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            AutopostError::from(infra)
        })?;

        Ok(HttpClient { client, retry_policy: self.retry_policy })
    }
}

fn should_retry_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("unknown status");
    if body.is_empty() {
        format!("HTTP {} {}", status.as_u16(), reason)
    } else {
        format!("HTTP {} {}: {}", status.as_u16(), reason, body)
    }
}

async fn read_error_body(response: Response) -> String {
    match response.text().await {
        Ok(body) => body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
        Err(_) => String::new(),
    }
}
