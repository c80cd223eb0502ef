//! Convenience re-exports for common use.

pub use crate::auth::{GrantVariant, TokenExchanger, TokenSet, TokenStore};
pub use crate::config::ClientConfig;
pub use crate::error::{AuthError, Result, TransportError};
pub use crate::transport::{ReqwestTransport, TokenRequest, TokenTransport};
