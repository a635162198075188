//! HTTP client for the AllDebrid v4 REST API.
//!
//! Handles API key validation, bearer authentication, the `agent` parameter,
//! exponential backoff retry for idempotent endpoints, envelope decoding and
//! the lifecycle of the underlying HTTP session.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use ad_core::config::ApiConfig;
use ad_core::constants;
use ad_core::error::{AdError, AdResult};

use crate::response::ApiResponse;
use crate::routes::{Endpoint, EndpointTable};

lazy_static! {
    static ref API_KEY_PATTERN: Regex = Regex::new(r"^[a-zA-Z0-9]{20}$").expect("valid regex");
}

/// Whether `key` has the shape of an API key issued by the service.
pub fn is_valid_api_key(key: &str) -> bool {
    API_KEY_PATTERN.is_match(key)
}

/// Request parameters as ordered key/value pairs. List parameters repeat
/// their key (`magnets[]=a&magnets[]=b`).
pub type Params = Vec<(String, String)>;

/// Retry configuration for idempotent HTTP requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay between retries (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

/// HTTP client for communicating with the AllDebrid API.
///
/// The underlying `reqwest::Client` (and its connection pool) is opened on
/// the first request and dropped by [`ApiClient::release`]. Clones share the
/// same session.
#[derive(Clone)]
pub struct ApiClient {
    /// Lazily opened HTTP session.
    session: Arc<Mutex<Option<Client>>>,
    /// Base URL with trailing slash (e.g. "https://api.alldebrid.com/v4/").
    base_url: String,
    /// API key sent as bearer token to authenticated endpoints.
    api_key: Option<String>,
    /// Value of the `agent` query parameter.
    agent: String,
    /// Optional proxy URL.
    proxy: Option<String>,
    /// Endpoint paths.
    endpoints: Arc<EndpointTable>,
    /// Default request timeout.
    timeout: Duration,
    /// Extended timeout for file uploads.
    extended_timeout: Duration,
    /// Retry configuration.
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Create a new ApiClient from API configuration.
    pub fn new(config: &ApiConfig) -> AdResult<Self> {
        if let Some(proxy) = config.proxy.as_deref() {
            reqwest::Proxy::all(proxy)
                .map_err(|e| AdError::Config(format!("invalid proxy url '{proxy}': {e}")))?;
        }

        let endpoints = EndpointTable::with_overrides(&config.endpoints)?;
        let timeout = config.timeout();

        Ok(Self {
            session: Arc::new(Mutex::new(None)),
            base_url: config.normalized_base_url(),
            api_key: config.api_key().map(str::to_string),
            agent: config.agent.clone(),
            proxy: config.proxy.clone(),
            endpoints: Arc::new(endpoints),
            timeout,
            extended_timeout: timeout * constants::EXTENDED_TIMEOUT_MULTIPLIER as u32,
            retry_config: RetryConfig::default(),
        })
    }

    /// Set custom retry configuration.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, self.endpoints.path(endpoint))
    }

    // --- Session lifecycle ---

    /// Get the open session, opening one if needed.
    fn session(&self) -> AdResult<Client> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = self.build_client()?;
        debug!("opened HTTP session to {}", self.base_url);
        *guard = Some(client.clone());
        Ok(client)
    }

    fn build_client(&self) -> AdResult<Client> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30));

        if let Some(proxy) = self.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| AdError::Config(format!("invalid proxy url: {e}")))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| AdError::Http(format!("failed to build HTTP client: {e}")))
    }

    /// Drop the HTTP session and its pooled connections.
    ///
    /// Idempotent. A later request opens a fresh session.
    pub fn release(&self) {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!("released HTTP session to {}", self.base_url);
        }
    }

    /// Whether a session is currently open.
    pub fn has_open_session(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // --- Request plumbing ---

    /// Resolve the bearer token for an endpoint, validating it before any I/O.
    fn credentials(&self, endpoint: Endpoint) -> AdResult<Option<&str>> {
        if !endpoint.requires_auth() {
            return Ok(None);
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdError::MissingConfig(format!("api key (required by {endpoint})")))?;
        if !is_valid_api_key(key) {
            return Err(AdError::InvalidApiKey);
        }
        Ok(Some(key))
    }

    /// Internal: build a request for an endpoint. GET parameters go to the
    /// query string, POST parameters to an urlencoded form body.
    fn build_request(
        &self,
        client: &Client,
        endpoint: Endpoint,
        key: Option<&str>,
        params: &[(String, String)],
        timeout: Duration,
    ) -> RequestBuilder {
        let method = endpoint.method();
        let mut builder = client
            .request(method.clone(), self.url(endpoint))
            .timeout(timeout)
            .query(&[("agent", self.agent.as_str())]);

        if let Some(k) = key {
            builder = builder.bearer_auth(k);
        }

        if method == Method::GET {
            builder.query(params)
        } else {
            builder.form(params)
        }
    }

    /// Execute a request, retrying with exponential backoff when the
    /// endpoint is idempotent.
    async fn request_with_retry(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> AdResult<Response> {
        let key = self.credentials(endpoint)?;
        let client = self.session()?;
        let max_retries = if endpoint.is_idempotent() {
            self.retry_config.max_retries
        } else {
            0
        };
        debug!("{} {}", endpoint.method(), endpoint);

        let mut last_error: Option<AdError> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.calculate_retry_delay(attempt - 1);
                warn!(
                    "retrying {} (attempt {}/{}) after {:.1}s",
                    endpoint,
                    attempt + 1,
                    max_retries + 1,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            let builder = self.build_request(&client, endpoint, key, params, self.timeout);

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if self
                        .retry_config
                        .retryable_statuses
                        .contains(&status.as_u16())
                        && attempt < max_retries
                    {
                        warn!("retryable status {} from {}", status.as_u16(), endpoint);
                        last_error = Some(AdError::ServerError {
                            status: status.as_u16(),
                            message: format!("retryable status {status}"),
                        });
                        continue;
                    }

                    return Self::check_status(response).await;
                }
                Err(e) => {
                    let is_retryable = e.is_timeout() || e.is_connect();
                    let err = Self::classify_error(e);

                    if is_retryable && attempt < max_retries {
                        warn!("retryable error on {}: {}", endpoint, err);
                        last_error = Some(err);
                        continue;
                    }

                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AdError::Http("max retries exceeded".into())))
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.retry_config.base_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << attempt.min(32));
        let max_ms = self.retry_config.max_delay.as_millis() as u64;
        Duration::from_millis(delay_ms.min(max_ms))
    }

    // --- Public request helpers ---

    /// Call an endpoint and decode the payload of its envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> AdResult<T> {
        let response = self.request_with_retry(endpoint, params).await?;
        Self::parse_response::<T>(response).await?.into_data()
    }

    /// POST a multipart form (file uploads) and decode the payload.
    /// Multipart forms cannot be cloned, so this is never retried.
    pub async fn call_multipart<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        form: reqwest::multipart::Form,
    ) -> AdResult<T> {
        let key = self.credentials(endpoint)?;
        let client = self.session()?;
        debug!("POST (multipart) {}", endpoint);

        let mut builder = client
            .post(self.url(endpoint))
            .query(&[("agent", self.agent.as_str())])
            .multipart(form)
            .timeout(self.extended_timeout);
        if let Some(k) = key {
            builder = builder.bearer_auth(k);
        }

        let response = builder.send().await.map_err(Self::classify_error)?;
        let response = Self::check_status(response).await?;
        Self::parse_response::<T>(response).await?.into_data()
    }

    /// Ping the API. Returns the round-trip latency.
    pub async fn health_check(&self) -> AdResult<Duration> {
        let start = std::time::Instant::now();
        let pong = self.ping().await?;
        if pong {
            Ok(start.elapsed())
        } else {
            Err(AdError::Http("health check failed".into()))
        }
    }

    /// Deserialize a response body into an ApiResponse<T>.
    pub async fn parse_response<T: DeserializeOwned>(
        response: Response,
    ) -> AdResult<ApiResponse<T>> {
        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| AdError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Check the HTTP status code and convert to AdError if needed.
    ///
    /// Error bodies that carry an envelope keep the service's error code.
    async fn check_status(response: Response) -> AdResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ApiResponse>(&body) {
            if let Some(error) = envelope.error {
                return Err(AdError::api(error.code, error.message));
            }
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AdError::AuthFailed(format!("server returned {status}")));
        }

        Err(AdError::ServerError {
            status: status.as_u16(),
            message: body,
        })
    }

    /// Classify a reqwest error into an AdError variant.
    fn classify_error(e: reqwest::Error) -> AdError {
        if e.is_timeout() {
            AdError::Timeout(e.to_string())
        } else if e.is_connect() {
            AdError::Http(format!("connection failed: {e}"))
        } else {
            AdError::Http(e.to_string())
        }
    }
}

/// Build `key[]` list parameters.
pub(crate) fn list_params<S: AsRef<str>>(key: &str, values: &[S]) -> Params {
    values
        .iter()
        .map(|v| (format!("{key}[]"), v.as_ref().to_string()))
        .collect()
}

/// Reject empty list input before any network call.
pub(crate) fn require_non_empty<S: AsRef<str>>(what: &str, values: &[S]) -> AdResult<()> {
    if values.is_empty() || values.iter().any(|v| v.as_ref().trim().is_empty()) {
        return Err(AdError::InvalidInput(format!("{what} must be a non-empty list of non-empty values")));
    }
    Ok(())
}
