//! OAuth client configuration (code > env > TOML file).

use std::fmt;
use std::path::Path;

use bon::Builder;
use serde::Deserialize;

use crate::error::{AuthError, Result};

const ENV_CLIENT_ID: &str = "OAUTH_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "OAUTH_CLIENT_SECRET";
const ENV_TOKEN_URL: &str = "OAUTH_TOKEN_URL";
const ENV_SCOPES: &str = "OAUTH_SCOPES";

/// Immutable client settings shared by the exchanger and every store it
/// produces.
///
/// # Example
/// ```no_run
/// use tokenwell::config::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .client_id("my-app")
///     .client_secret("s3cret")
///     .token_url("https://auth.example.com/oauth/token")
///     .scopes(vec!["read".to_string(), "write".to_string()])
///     .build();
/// assert_eq!(config.scope_param().as_deref(), Some("read write"));
/// ```
#[derive(Clone, PartialEq, Eq, Builder, Deserialize)]
pub struct ClientConfig {
    #[builder(into)]
    client_id: String,
    #[builder(into)]
    client_secret: String,
    #[builder(into)]
    token_url: String,
    #[builder(default)]
    #[serde(default)]
    scopes: Vec<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl ClientConfig {
    /// Load from environment variables (`OAUTH_CLIENT_ID`,
    /// `OAUTH_CLIENT_SECRET`, `OAUTH_TOKEN_URL`, `OAUTH_SCOPES`).
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let config = Self {
            client_id: required_env(ENV_CLIENT_ID)?,
            client_secret: std::env::var(ENV_CLIENT_SECRET).unwrap_or_default(),
            token_url: required_env(ENV_TOKEN_URL)?,
            scopes: std::env::var(ENV_SCOPES)
                .map(|raw| split_scopes(&raw))
                .unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML table with `client_id`, `client_secret`, `token_url` and
    /// optional `scopes`.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file; see [`ClientConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AuthError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check that the client id is set and the token URL is an absolute
    /// http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration("client_id is empty".to_string()));
        }
        let url = reqwest::Url::parse(&self.token_url).map_err(|err| {
            AuthError::Configuration(format!("invalid token_url {:?}: {err}", self.token_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::Configuration(format!(
                "token_url must use http or https, got {}",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// OAuth client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth client secret; may be empty for public clients.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Absolute URL of the token endpoint.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Configured scopes, in order.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Space-joined scope list, or `None` when no scope is configured.
    pub fn scope_param(&self) -> Option<String> {
        let scopes: Vec<&str> = self
            .scopes
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if scopes.is_empty() {
            None
        } else {
            Some(scopes.join(" "))
        }
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| AuthError::Configuration(format!("Environment variable {key} not set")))
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
