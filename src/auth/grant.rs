use std::fmt;
use std::str::FromStr;

use strum::Display;

use crate::config::ClientConfig;

const AUTHORIZATION_CODE: &str = "authorization_code";

/// Which family of grant an exchange belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GrantKind {
    Password,
    Authorization,
    Refresh,
}

/// Wire identifier for an authorization-style grant.
///
/// Several authorization flows share the `code` + `state` request shape and
/// differ only in `grant_type`; `Custom` selects an application-defined one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrantVariant {
    #[default]
    AuthorizationCode,
    Custom(String),
}

impl GrantVariant {
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationCode => AUTHORIZATION_CODE,
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for GrantVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantVariant {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            AUTHORIZATION_CODE => Self::AuthorizationCode,
            other => Self::Custom(other.to_string()),
        })
    }
}

/// One grant to send to the token endpoint. Consumed by a single exchange.
#[derive(Clone)]
pub enum GrantRequest {
    Password {
        username: String,
        password: String,
    },
    Authorization {
        code: String,
        state: String,
        variant: GrantVariant,
    },
    Refresh {
        refresh_token: String,
    },
}

impl GrantRequest {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn authorization(
        code: impl Into<String>,
        state: impl Into<String>,
        variant: GrantVariant,
    ) -> Self {
        Self::Authorization {
            code: code.into(),
            state: state.into(),
            variant,
        }
    }

    pub fn refresh(refresh_token: impl Into<String>) -> Self {
        Self::Refresh {
            refresh_token: refresh_token.into(),
        }
    }

    pub fn kind(&self) -> GrantKind {
        match self {
            Self::Password { .. } => GrantKind::Password,
            Self::Authorization { .. } => GrantKind::Authorization,
            Self::Refresh { .. } => GrantKind::Refresh,
        }
    }

    /// The `grant_type` form value.
    pub fn grant_type(&self) -> &str {
        match self {
            Self::Password { .. } => "password",
            Self::Authorization { variant, .. } => variant.as_str(),
            Self::Refresh { .. } => "refresh_token",
        }
    }

    /// Form body for this grant: grant fields first, then client credentials
    /// and scope. `scope` is omitted when the client has none configured.
    pub fn form(&self, config: &ClientConfig) -> Vec<(String, String)> {
        let mut form = vec![("grant_type".to_string(), self.grant_type().to_string())];
        match self {
            Self::Password { username, password } => {
                form.push(("username".to_string(), username.clone()));
                form.push(("password".to_string(), password.clone()));
            }
            Self::Authorization { code, state, .. } => {
                form.push(("code".to_string(), code.clone()));
                form.push(("state".to_string(), state.clone()));
            }
            Self::Refresh { refresh_token } => {
                form.push(("refresh_token".to_string(), refresh_token.clone()));
            }
        }
        form.push(("client_id".to_string(), config.client_id().to_string()));
        form.push((
            "client_secret".to_string(),
            config.client_secret().to_string(),
        ));
        if let Some(scope) = config.scope_param() {
            form.push(("scope".to_string(), scope));
        }
        form
    }
}

impl fmt::Debug for GrantRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"..")
                .finish(),
            Self::Authorization { state, variant, .. } => f
                .debug_struct("Authorization")
                .field("code", &"..")
                .field("state", state)
                .field("variant", variant)
                .finish(),
            Self::Refresh { .. } => f
                .debug_struct("Refresh")
                .field("refresh_token", &"..")
                .finish(),
        }
    }
}
