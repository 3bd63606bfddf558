//! # MPT API Client
//!
//! HTTP client for the marketplace platform REST API. Every request is resolved
//! against a base URL, carries the bearer token and the SDK user agent, and is
//! retried on transport failures and gateway-class server errors.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::{MptError, MptResult};
use crate::config::ExtensionConfig;
use crate::constants::{defaults, POOL_MAX_IDLE_PER_HOST, RETRY_STATUSES, USER_AGENT};

/// Configuration for the platform client
///
/// # Examples
///
/// ```rust
/// use mpt_extension_sdk::mpt_http::MptClientConfig;
///
/// let config = MptClientConfig::new("https://api.example.com/v1", "idt:TKN-1");
/// assert_eq!(config.max_retries, 5);
/// assert_eq!(config.backoff_factor_ms, 100);
/// ```
#[derive(Clone)]
pub struct MptClientConfig {
    /// API root every relative path is joined against
    pub base_url: String,
    pub api_token: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Retry attempts after the first request
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub backoff_factor_ms: u64,
    pub pool_max_idle_per_host: usize,
}

impl std::fmt::Debug for MptClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MptClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[MASKED]")
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("backoff_factor_ms", &self.backoff_factor_ms)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}

impl MptClientConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout_ms: defaults::HTTP_TIMEOUT_MS,
            max_retries: defaults::HTTP_MAX_RETRIES,
            backoff_factor_ms: defaults::HTTP_BACKOFF_FACTOR_MS,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
        }
    }

    fn from_extension_config(config: &ExtensionConfig, api_token: &str) -> Self {
        Self {
            base_url: config.api_v1_url(),
            api_token: api_token.to_string(),
            timeout_ms: config.http_timeout_ms,
            max_retries: config.http_max_retries,
            backoff_factor_ms: config.http_backoff_factor_ms,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
        }
    }

    /// Backoff before retry number `retry` (1-based): `factor * 2^(retry-1)`
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_factor_ms.saturating_mul(1 << exponent))
    }
}

/// Platform REST client
#[derive(Clone)]
pub struct MptClient {
    client: Client,
    config: MptClientConfig,
    base_url: Url,
}

impl std::fmt::Debug for MptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MptClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[MASKED]")
            .field("timeout_ms", &self.config.timeout_ms)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}

impl MptClient {
    /// Create a client, normalizing the base URL to end with `/`
    pub fn new(config: MptClientConfig) -> MptResult<Self> {
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| MptError::invalid_url(&config.base_url, e))?;

        let mut default_headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|e| MptError::config(format!("Invalid API token: {e}")))?;
        bearer.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .default_headers(default_headers)
            .build()
            .map_err(|e| MptError::config(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            "Created MPT API client"
        );

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Client for `{api_base_url}/v1/` authenticated with the extension token
    pub fn from_config(config: &ExtensionConfig) -> MptResult<Self> {
        Self::new(MptClientConfig::from_extension_config(
            config,
            &config.api_token,
        ))
    }

    /// Client for `{api_base_url}/v1/` authenticated with the operations token
    pub fn operations_client(config: &ExtensionConfig) -> MptResult<Self> {
        Self::new(MptClientConfig::from_extension_config(
            config,
            &config.api_token_operations,
        ))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &MptClientConfig {
        &self.config
    }

    /// Resolve `path` against the base URL; one leading `/` is dropped so
    /// `/commerce/orders` stays under the versioned root
    pub fn join_url(&self, path: &str) -> MptResult<Url> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        self.base_url
            .join(relative)
            .map_err(|e| MptError::invalid_url(path, e))
    }

    pub async fn get(&self, path: &str) -> MptResult<Response> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> MptResult<Response> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> MptResult<Response> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> MptResult<Response> {
        self.send(Method::DELETE, path, None).await
    }

    /// GET and decode a successful JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> MptResult<T> {
        let response = self.get(path).await?;
        Self::handle_response(response, "GET", path).await
    }

    /// POST a JSON body and decode the successful JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> MptResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(path, body).await?;
        Self::handle_response(response, "POST", path).await
    }

    /// PUT a JSON body and decode the successful JSON response
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> MptResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.put(path, body).await?;
        Self::handle_response(response, "PUT", path).await
    }

    /// Send with retries. Transport timeouts/connect failures and
    /// `500 502 503 504` responses are retried up to `max_retries` times; the
    /// last response is returned as-is once retries are exhausted.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> MptResult<Response> {
        let url = self.join_url(path)?;

        debug!(method = %method, url = %url, "Sending MPT API request");

        let mut retries = 0;
        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            if let Some(ref body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !RETRY_STATUSES.contains(&status) || retries >= self.config.max_retries {
                        return Ok(response);
                    }

                    warn!(
                        method = %method,
                        url = %url,
                        status = status,
                        retry = retries + 1,
                        max_retries = self.config.max_retries,
                        "Server error from MPT API, will retry"
                    );
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if !retryable || retries >= self.config.max_retries {
                        error!(
                            method = %method,
                            url = %url,
                            error = %e,
                            retries = retries,
                            "MPT API request failed"
                        );
                        return Err(MptError::Transport(e));
                    }

                    warn!(
                        method = %method,
                        url = %url,
                        error = %e,
                        retry = retries + 1,
                        max_retries = self.config.max_retries,
                        "Network error calling MPT API, will retry"
                    );
                }
            }

            retries += 1;
            tokio::time::sleep(self.config.backoff(retries)).await;
        }
    }

    /// Map a non-2xx response to [`MptError`]
    pub async fn error_for_status(response: Response) -> MptResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(MptError::from_response_body(status.as_u16(), &body))
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
        method: &str,
        path: &str,
    ) -> MptResult<T> {
        let response = match Self::error_for_status(response).await {
            Ok(response) => response,
            Err(e) => {
                error!(method = method, path = path, error = %e, "MPT API call failed");
                return Err(e);
            }
        };

        let bytes = response.bytes().await?;
        let decoded = serde_json::from_slice(&bytes)?;
        debug!(method = method, path = path, "MPT API call succeeded");
        Ok(decoded)
    }
}
