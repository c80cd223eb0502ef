//! Error types for tokenwell.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::grant::GrantKind;

/// Failure reported by a [`TokenTransport`](crate::transport::TokenTransport).
///
/// Cloneable so a single failed exchange can be handed to every caller
/// waiting on the same refresh.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[source] Arc<reqwest::Error>),

    #[error("token endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(Arc::new(error))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(Arc::new(error))
    }
}

/// Primary error type for token operations.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token endpoint call failed for the given grant.
    #[error("{grant} grant failed at token endpoint: {source}")]
    EndpointFailure {
        grant: GrantKind,
        #[source]
        source: TransportError,
    },

    /// A refresh and its single retry both failed.
    #[error("token refresh failed after retry: {last}")]
    RefreshExhausted {
        first: Box<AuthError>,
        #[source]
        last: Box<AuthError>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub(crate) fn endpoint(grant: GrantKind, source: TransportError) -> Self {
        Self::EndpointFailure { grant, source }
    }

    /// HTTP status behind this error. For an exhausted refresh this is the
    /// status of the last attempt.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::EndpointFailure { source, .. } => source.status(),
            Self::RefreshExhausted { last, .. } => last.status(),
            Self::Configuration(_) => None,
        }
    }

    pub fn is_refresh_exhausted(&self) -> bool {
        matches!(self, Self::RefreshExhausted { .. })
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
