//! OAuth grants, token sets, and the refreshing token store.

pub mod exchanger;
pub mod grant;
pub mod store;
pub mod token;

pub use crate::error::AuthError;
pub use exchanger::TokenExchanger;
pub use grant::{GrantKind, GrantRequest, GrantVariant};
pub use store::{RefreshCallback, TokenStore, REFRESH_RETRY_DELAY};
pub use token::{TokenResponse, TokenSet};
