//! HTTP client with bounded timeouts
//!
//! A thin wrapper over `reqwest` used by the authenticator and the query
//! dispatcher. Every request is bounded by the configured timeout. Requests
//! are never retried: a failed call is reported to the caller, which decides
//! whether the failure is fatal.
//!
//! Response status codes are not turned into errors here. Salesforce reports
//! query failures as JSON bodies on 4xx responses, and the caller needs those
//! bodies.

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            user_agent: format!("salesforce-extract/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is exactly 200 OK
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// HTTP client with a per-request timeout
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> reqwest::Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// GET `url` with a bearer token, asking for JSON
    pub async fn get_json_text(&self, url: &str, bearer_token: &str) -> reqwest::Result<HttpResponse> {
        let req = self
            .client
            .get(url)
            .bearer_auth(bearer_token)
            .header(ACCEPT, "application/json");
        self.send(req, "GET", url).await
    }

    /// POST a form-encoded body to `url`
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> reqwest::Result<HttpResponse> {
        let req = self.client.post(url).form(form);
        self.send(req, "POST", url).await
    }

    async fn send(&self, req: RequestBuilder, method: &str, url: &str) -> reqwest::Result<HttpResponse> {
        let response = req.timeout(self.config.timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("{} {} -> {}", method, url, status);
        Ok(HttpResponse { status, body })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
