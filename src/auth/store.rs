use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::{AuthError, Result};
use crate::util::retry::{retry_once, RetryExhausted};

use super::exchanger::TokenExchanger;
use super::token::TokenSet;

/// Delay between a failed refresh and its single retry.
pub const REFRESH_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Single-subscriber notification fired after each successful refresh.
pub type RefreshCallback = Arc<dyn Fn(&TokenSet) + Send + Sync>;

type RefreshOperation = Shared<BoxFuture<'static, Result<TokenSet>>>;

/// Holds one token set and hands out valid access tokens, refreshing when
/// the stored set has expired.
///
/// Concurrent callers that find the tokens expired share a single in-flight
/// refresh. A failed refresh is retried once after [`REFRESH_RETRY_DELAY`];
/// if that also fails every waiter gets [`AuthError::RefreshExhausted`] and
/// the stored tokens stay as they were.
///
/// Clones are handles to the same store.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    exchanger: TokenExchanger,
    tokens: RwLock<TokenSet>,
    callback: RwLock<Option<RefreshCallback>>,
    in_flight: Mutex<Option<RefreshOperation>>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("exchanger", &self.inner.exchanger)
            .field("expires_at", &self.inner.snapshot().expires_at)
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

impl TokenStore {
    /// Store seeded with `tokens` that refreshes through `exchanger`.
    pub fn new(exchanger: TokenExchanger, tokens: TokenSet) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                exchanger,
                tokens: RwLock::new(tokens),
                callback: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Current access token, refreshing first if the stored one has expired.
    pub async fn get_access_token(&self) -> Result<String> {
        let tokens = self.inner.snapshot();
        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }
        let refreshed = self.refresh_token().await?;
        Ok(refreshed.access_token)
    }

    /// Snapshot of the stored tokens. Never triggers a refresh.
    pub fn get_tokens(&self) -> TokenSet {
        self.inner.snapshot()
    }

    /// Register the refresh callback, replacing any previous one.
    pub fn on_refresh_token<F>(&self, callback: F)
    where
        F: Fn(&TokenSet) + Send + Sync + 'static,
    {
        let mut slot = self
            .inner
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(callback));
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Join the in-flight refresh, or start one if none is running.
    async fn refresh_token(&self) -> Result<TokenSet> {
        let operation = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(operation) => {
                    tracing::debug!("Joining in-flight token refresh");
                    operation.clone()
                }
                None => {
                    tracing::debug!("Starting token refresh");
                    let operation = run_refresh(self.inner.clone()).boxed().shared();
                    *slot = Some(operation.clone());
                    operation
                }
            }
        };

        let outcome = operation.clone().await;

        // Cleared only once the outcome is settled, and only if no newer
        // operation has taken the slot.
        let mut slot = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&operation))
        {
            *slot = None;
        }
        outcome
    }
}

impl StoreInner {
    fn snapshot(&self) -> TokenSet {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, tokens: TokenSet) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    fn notify(&self, tokens: &TokenSet) {
        let callback = self
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(callback) = callback else {
            return;
        };
        // A panicking callback must not poison the shared refresh; the tokens
        // are already replaced at this point.
        if catch_unwind(AssertUnwindSafe(|| callback(tokens))).is_err() {
            tracing::error!("Refresh callback panicked; continuing with new tokens");
        }
    }
}

async fn run_refresh(inner: Arc<StoreInner>) -> Result<TokenSet> {
    let current = inner.snapshot();
    if !current.is_expired() {
        // A refresh that settled just before this one started already
        // replaced the tokens.
        return Ok(current);
    }

    let exchanger = inner.exchanger.clone();
    let refresh_token = current.refresh_token;
    let refreshed = retry_once(REFRESH_RETRY_DELAY, || {
        let exchanger = exchanger.clone();
        let refresh_token = refresh_token.clone();
        async move { exchanger.exchange_refresh(&refresh_token).await }
    })
    .await
    .map_err(|RetryExhausted { first, last }| {
        tracing::error!(error = %last, "Token refresh failed after retry");
        AuthError::RefreshExhausted {
            first: Box::new(first),
            last: Box::new(last),
        }
    })?;

    inner.replace(refreshed.clone());
    inner.notify(&refreshed);
    tracing::debug!(expires_at = %refreshed.expires_at, "Token refresh complete");
    Ok(refreshed)
}
