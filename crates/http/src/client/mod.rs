//! Upstream API client

pub mod auth;
pub mod error;
pub mod request;
pub mod resources;
pub mod session;

pub use error::{ClientError, UpstreamError};
pub use request::ApiRequest;
pub use resources::Resource;
pub use session::SessionClient;

use reqwest::{Client, ClientBuilder, Method, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;
use usina_core::SessionHandle;

/// Timeout applied to every upstream call unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Plain client for the upstream REST API
///
/// Holds no credentials: the bearer token, when needed, is passed with each
/// call. Wrap it with [`ApiClient::with_session`] to get automatic token
/// refresh.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bind this client to a browser session
    pub fn with_session<'a>(&'a self, session: &'a SessionHandle) -> SessionClient<'a> {
        SessionClient::new(self, session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Create a request builder, optionally authenticated
    pub fn request(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, self.url(path));

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Execute a request and handle common errors
    ///
    /// An empty success body deserializes from JSON `null`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.is_empty() {
                Ok(serde_json::from_value(Value::Null)?)
            } else {
                Ok(serde_json::from_slice(&bytes)?)
            }
        } else {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            Err(ClientError::Upstream(UpstreamError::new(status, body)))
        }
    }

    /// Send one [`ApiRequest`] exactly as described, without any retry
    pub async fn send(&self, call: &ApiRequest) -> Result<Value, ClientError> {
        trace!(
            method = %call.method(),
            path = call.path(),
            authenticated = call.bearer().is_some(),
            retry = call.is_retry(),
            "upstream request"
        );

        let mut request = self.request(call.method().clone(), call.path(), call.bearer());
        if let Some(body) = call.body() {
            request = request.json(body);
        }
        self.execute(request).await
    }

    pub async fn get(&self, path: &str, bearer: Option<&str>) -> Result<Value, ClientError> {
        self.send(&authorize(ApiRequest::get(path), bearer)).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        bearer: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.send(&authorize(ApiRequest::post(path, body), bearer))
            .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        bearer: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.send(&authorize(ApiRequest::put(path, body), bearer))
            .await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: Value,
        bearer: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.send(&authorize(ApiRequest::patch(path, body), bearer))
            .await
    }

    pub async fn delete(&self, path: &str, bearer: Option<&str>) -> Result<Value, ClientError> {
        self.send(&authorize(ApiRequest::delete(path), bearer))
            .await
    }
}

fn authorize(request: ApiRequest, bearer: Option<&str>) -> ApiRequest {
    match bearer {
        Some(token) => request.with_bearer(token),
        None => request,
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ClientError::Configuration("timeout must be positive".into()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("usina-web/", env!("CARGO_PKG_VERSION")).to_string());

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build client: {e}")))?;

        Ok(ApiClient { client, base_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/ops/"), "http://localhost:8000/api/ops/");
        assert_eq!(client.url("ops/"), "http://localhost:8000/api/ops/");
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = ApiClient::builder()
            .base_url("http://localhost")
            .timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
