use std::sync::Arc;

use chrono::Utc;

use crate::config::ClientConfig;
use crate::error::{AuthError, Result};
use crate::transport::{ReqwestTransport, TokenRequest, TokenTransport};

use super::grant::{GrantRequest, GrantVariant};
use super::store::TokenStore;
use super::token::TokenSet;

/// Exchanges credentials for tokens at the configured token endpoint.
///
/// Holds no token state; each call is one POST. Cloning is cheap and clones
/// share the transport.
///
/// # Example
/// ```no_run
/// use tokenwell::auth::TokenExchanger;
/// use tokenwell::config::ClientConfig;
///
/// # async fn example() -> tokenwell::error::Result<()> {
/// let config = ClientConfig::builder()
///     .client_id("my-app")
///     .client_secret("s3cret")
///     .token_url("https://auth.example.com/oauth/token")
///     .build();
/// let store = TokenExchanger::new(config)
///     .login_password("ada", "hunter2")
///     .await?;
/// store.on_refresh_token(|tokens| println!("new token expires at {}", tokens.expires_at));
/// let access_token = store.get_access_token().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenExchanger {
    config: Arc<ClientConfig>,
    transport: Arc<dyn TokenTransport>,
}

impl std::fmt::Debug for TokenExchanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchanger")
            .field("config", &self.config)
            .field("transport", &"..")
            .finish()
    }
}

impl TokenExchanger {
    /// Exchanger for `config` using the shared reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    /// Replace the HTTP transport, e.g. with a custom client or a test double.
    pub fn with_transport(mut self, transport: Arc<dyn TokenTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Client configuration used for every exchange.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resource-owner password grant.
    pub async fn exchange_password(&self, username: &str, password: &str) -> Result<TokenSet> {
        self.exchange(GrantRequest::password(username, password))
            .await
    }

    /// Authorization-style grant; `variant` picks the `grant_type`.
    pub async fn exchange_authorization(
        &self,
        code: &str,
        state: &str,
        variant: GrantVariant,
    ) -> Result<TokenSet> {
        self.exchange(GrantRequest::authorization(code, state, variant))
            .await
    }

    /// Refresh-token grant. If the endpoint does not rotate the refresh
    /// token, `refresh_token` is kept in the returned set.
    pub async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenSet> {
        self.exchange(GrantRequest::refresh(refresh_token)).await
    }

    /// Send one grant to the token endpoint. Never retries.
    pub async fn exchange(&self, grant: GrantRequest) -> Result<TokenSet> {
        let kind = grant.kind();
        let request = TokenRequest::new(self.config.token_url(), grant.form(&self.config));
        tracing::debug!(grant = %kind, url = %request.url, "Exchanging grant for tokens");

        let response = self
            .transport
            .post_form(request)
            .await
            .map_err(|err| {
                tracing::debug!(grant = %kind, error = %err, "Token exchange failed");
                AuthError::endpoint(kind, err)
            })?;

        let fallback = match &grant {
            GrantRequest::Refresh { refresh_token } => Some(refresh_token.as_str()),
            _ => None,
        };
        let tokens = TokenSet::from_response(response, Utc::now(), fallback);
        tracing::debug!(grant = %kind, expires_in = tokens.expires_in, "Token exchange succeeded");
        Ok(tokens)
    }

    /// Log in with a password grant and return a store seeded with the
    /// resulting tokens.
    pub async fn login_password(&self, username: &str, password: &str) -> Result<TokenStore> {
        let tokens = self.exchange_password(username, password).await?;
        Ok(self.resume(tokens))
    }

    /// Log in with an authorization-style grant and return a seeded store.
    pub async fn login_authorization(
        &self,
        code: &str,
        state: &str,
        variant: GrantVariant,
    ) -> Result<TokenStore> {
        let tokens = self.exchange_authorization(code, state, variant).await?;
        Ok(self.resume(tokens))
    }

    /// Wrap previously obtained (e.g. persisted) tokens in a store that
    /// refreshes through this exchanger.
    pub fn resume(&self, tokens: TokenSet) -> TokenStore {
        TokenStore::new(self.clone(), tokens)
    }
}
