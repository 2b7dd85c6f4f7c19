//! HTTP-backed collaborator implementations.
//!
//! These clients talk to a generative-content API and a social-platform
//! API over JSON. Transient failures are absorbed with retry/backoff;
//! research degrades to a topic-only summary when its upstream stays
//! unavailable, so the engine never sees that class of failure.

use super::{
    with_retry, ComposeRequest, GenerativeClient, ImageRequest, RetryPolicy, SocialClient,
    WorkflowPlan,
};
use crate::core::{ComposedPost, ImageData, PublishReceipt, ResearchResult};
use anyhow::Context as _;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Configuration shared by the HTTP collaborator clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Base URL of the service.
    pub base_url: String,
    /// Bearer credential for the service.
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_timeout() -> f64 {
    30.0
}

impl HttpClientConfig {
    /// Creates a configuration for a service.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_seconds: default_timeout(),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

async fn post_json<B, R>(
    http: &reqwest::Client,
    config: &HttpClientConfig,
    bearer: &str,
    path: &str,
    body: &B,
) -> anyhow::Result<R>
where
    B: Serialize + Sync,
    R: DeserializeOwned,
{
    let url = format!("{}/{}", config.base_url.trim_end_matches('/'), path);
    with_retry(&config.retry, path, || {
        let request = http.post(&url).bearer_auth(bearer).json(body);
        async move {
            let response = request
                .send()
                .await
                .with_context(|| format!("request to {path} failed"))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                anyhow::bail!("{path} returned {status}: {detail}");
            }

            response
                .json::<R>()
                .await
                .with_context(|| format!("malformed response from {path}"))
        }
    })
    .await
}

/// Generative-content client over HTTP.
pub struct HttpGenerativeClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpGenerativeClient {
    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct PlanBody<'a> {
    intent: &'a str,
    has_reference_image: bool,
}

#[derive(Debug, Serialize)]
struct ResearchBody<'a> {
    topic: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageListResponse {
    images: Vec<ImageData>,
}

#[async_trait]
impl GenerativeClient for HttpGenerativeClient {
    async fn plan_workflow(
        &self,
        intent: &str,
        has_reference_image: bool,
    ) -> anyhow::Result<WorkflowPlan> {
        let body = PlanBody {
            intent,
            has_reference_image,
        };
        post_json(&self.http, &self.config, &self.config.api_key, "v1/plan", &body).await
    }

    async fn research(&self, topic: &str) -> anyhow::Result<ResearchResult> {
        let body = ResearchBody { topic };
        match post_json::<_, ResearchResult>(
            &self.http,
            &self.config,
            &self.config.api_key,
            "v1/research",
            &body,
        )
        .await
        {
            Ok(result) => Ok(result),
            Err(error) => {
                warn!(%topic, %error, "research upstream unavailable, degrading to topic-only summary");
                Ok(ResearchResult::degraded(format!(
                    "General overview of \"{topic}\" (live research was unavailable)"
                )))
            }
        }
    }

    async fn compose(&self, request: &ComposeRequest) -> anyhow::Result<ComposedPost> {
        post_json(&self.http, &self.config, &self.config.api_key, "v1/compose", request).await
    }

    async fn generate_image(&self, request: &ImageRequest) -> anyhow::Result<ImageData> {
        let response: ImageListResponse = post_json(
            &self.http,
            &self.config,
            &self.config.api_key,
            "v1/images",
            request,
        )
        .await?;
        response
            .images
            .into_iter()
            .next()
            .context("image endpoint returned no images")
    }
}

/// Social-platform client over HTTP.
pub struct HttpSocialClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpSocialClient {
    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a ImageData>,
}

#[async_trait]
impl SocialClient for HttpSocialClient {
    async fn publish(
        &self,
        token: &str,
        text: &str,
        image: Option<&ImageData>,
    ) -> anyhow::Result<PublishReceipt> {
        let body = PublishBody { text, image };
        post_json(&self.http, &self.config, token, "v2/posts", &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpClientConfig::new("https://api.example.com/", "key");
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = HttpClientConfig::new("https://api.example.com", "key")
            .with_timeout(5.0)
            .with_retry(RetryPolicy::none());
        assert_eq!(config.timeout_seconds, 5.0);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_clients_build() {
        let config = HttpClientConfig::new("https://api.example.com", "key");
        assert!(HttpGenerativeClient::new(config.clone()).is_ok());
        assert!(HttpSocialClient::new(config).is_ok());
    }
}
