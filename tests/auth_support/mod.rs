#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokenwell::auth::{TokenResponse, TokenSet};
use tokenwell::config::ClientConfig;
use tokenwell::error::TransportError;
use tokenwell::transport::{TokenRequest, TokenTransport};

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TokenResponse, TransportError>>>,
    requests: Mutex<Vec<TokenRequest>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_ok(&self, access_token: &str, refresh_token: Option<&str>, expires_in: u64) {
        self.responses
            .lock()
            .expect("script lock poisoned")
            .push_back(Ok(TokenResponse {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.map(str::to_string),
                token_type: "Bearer".to_string(),
                scope: None,
                expires_in,
            }));
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .expect("script lock poisoned")
            .push_back(Err(TransportError::Status {
                status,
                body: body.to_string(),
            }));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock poisoned").len()
    }

    pub fn requests(&self) -> Vec<TokenRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }
}

#[async_trait]
impl TokenTransport for ScriptedTransport {
    async fn post_form(&self, request: TokenRequest) -> Result<TokenResponse, TransportError> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_string())))
    }
}

pub fn client_config(token_url: &str) -> ClientConfig {
    ClientConfig::builder()
        .client_id("client-1")
        .client_secret("secret-1")
        .token_url(token_url)
        .build()
}

/// The `{a1, r1, expires_in: 3600}` set issued at the epoch, so it expired
/// at 3,600,000 ms and is stale for any real clock.
pub fn expired_tokens() -> TokenSet {
    TokenSet::from_response(
        TokenResponse {
            access_token: "a1".to_string(),
            refresh_token: Some("r1".to_string()),
            token_type: "Bearer".to_string(),
            scope: None,
            expires_in: 3600,
        },
        Utc.timestamp_millis_opt(0).unwrap(),
        None,
    )
}

pub fn fresh_tokens(access_token: &str) -> TokenSet {
    TokenSet::from_response(
        TokenResponse {
            access_token: access_token.to_string(),
            refresh_token: Some("r1".to_string()),
            token_type: "Bearer".to_string(),
            scope: None,
            expires_in: 3600,
        },
        Utc::now(),
        None,
    )
}
