use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Token payload as returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(deserialize_with = "deserialize_expires_in")]
    pub expires_in: u64,
}

/// A token set issued by one grant or refresh.
///
/// `expires_at` is derived once, at issuance, from `expires_in`; a refresh
/// replaces the whole set rather than updating it.
///
/// # Example
/// ```no_run
/// use chrono::{TimeZone, Utc};
/// use tokenwell::auth::{TokenResponse, TokenSet};
///
/// let response = TokenResponse {
///     access_token: "a1".to_string(),
///     refresh_token: Some("r1".to_string()),
///     token_type: "Bearer".to_string(),
///     scope: None,
///     expires_in: 3600,
/// };
/// let issued_at = Utc.timestamp_millis_opt(0).unwrap();
/// let tokens = TokenSet::from_response(response, issued_at, None);
/// assert_eq!(tokens.expires_at.timestamp_millis(), 3_600_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Build a token set issued at `issued_at`.
    ///
    /// When the response carries no refresh token, `fallback_refresh_token`
    /// is kept instead (refresh responses commonly omit it).
    pub fn from_response(
        response: TokenResponse,
        issued_at: DateTime<Utc>,
        fallback_refresh_token: Option<&str>,
    ) -> Self {
        let refresh_token = response
            .refresh_token
            .filter(|token| !token.is_empty())
            .or_else(|| fallback_refresh_token.map(str::to_string))
            .unwrap_or_default();
        Self {
            expires_at: expiry_from(issued_at, response.expires_in),
            access_token: response.access_token,
            refresh_token,
            token_type: response.token_type,
            scope: response.scope.unwrap_or_default(),
            expires_in: response.expires_in,
        }
    }

    /// Expired at the instant `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// [`is_expired_at`](Self::is_expired_at) against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Value for an `Authorization` header, e.g. `Bearer abc`.
    pub fn authorization_header(&self) -> String {
        let token_type = if self.token_type.is_empty() {
            DEFAULT_TOKEN_TYPE
        } else {
            self.token_type.as_str()
        };
        format!("{token_type} {}", self.access_token)
    }
}

fn expiry_from(issued_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let millis = i64::try_from(expires_in)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    Duration::try_milliseconds(millis)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if let Some(num) = value.as_u64() {
        return Ok(num);
    }
    if let Some(num) = value.as_f64() {
        // Whole-valued floats such as `3600.0` only; fractions are rejected.
        if num.is_finite() && num >= 0.0 && num.fract() == 0.0 && num < u64::MAX as f64 {
            return Ok(num as u64);
        }
        return Err(serde::de::Error::custom(
            "expires_in must be a non-negative whole number of seconds",
        ));
    }
    if let Some(text) = value.as_str() {
        return text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("expires_in is not a number"));
    }
    Err(serde::de::Error::custom("expires_in missing or invalid"))
}
