//! tokenwell: OAuth2 access-token lifecycle for client applications.
//!
//! Obtain tokens with a password or authorization-style grant, then ask the
//! returned [`TokenStore`](auth::TokenStore) for an access token before each
//! use. Expired tokens are refreshed transparently; concurrent callers share
//! one refresh, and a failed refresh is retried once before being reported.
//!
//! # Quick Start
//!
//! ```no_run
//! use tokenwell::prelude::*;
//!
//! # async fn example() -> tokenwell::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let store = TokenExchanger::new(config)
//!     .login_authorization("code-from-redirect", "state-123", GrantVariant::AuthorizationCode)
//!     .await?;
//! store.on_refresh_token(|tokens| {
//!     // persist `tokens` somewhere
//!     let _ = serde_json::to_string(tokens);
//! });
//! let header = format!("Bearer {}", store.get_access_token().await?);
//! # let _ = header;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;
pub mod util;
