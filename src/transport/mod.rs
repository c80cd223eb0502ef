//! HTTP transport used to reach the token endpoint.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::auth::token::TokenResponse;
use crate::error::TransportError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            })
    })
}

/// A fully shaped POST to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl TokenRequest {
    pub fn new(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            headers: vec![(ACCEPT.as_str().to_string(), "application/json".to_string())],
            form,
        }
    }

    /// Value of a form field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Capability to POST a form to the token endpoint and decode the reply.
///
/// Implementations own retries, pooling, TLS, and timeouts; callers see one
/// attempt per call.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    async fn post_form(&self, request: TokenRequest) -> Result<TokenResponse, TransportError>;
}

/// [`TokenTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Transport using the process-wide [`shared_client`].
    pub fn new() -> Self {
        Self {
            client: shared_client().clone(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenTransport for ReqwestTransport {
    async fn post_form(&self, request: TokenRequest) -> Result<TokenResponse, TransportError> {
        let mut builder = self.client.post(&request.url).form(&request.form);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
