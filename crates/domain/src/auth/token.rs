//! OAuth2 token value type

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OAuth2Error, OAuth2Result};

/// Credential state returned by a token endpoint.
///
/// A token is valid exactly when its access token is non-empty; the default
/// value is invalid. Optional string fields use the empty string for
/// "absent", matching the wire format where omitted fields and empty fields
/// are indistinguishable to the caller. `expires_in` keeps an explicit
/// `Option` so that a real zero-second expiry cannot be confused with "the
/// server said nothing".
///
/// Tokens are replaced wholesale: flow operations build a new `Token` and
/// swap it in, they never mutate a stored token field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Token {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

impl Token {
    /// Creates a token holding only an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    /// Sets the expiry in seconds.
    #[must_use]
    pub const fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Parses a token-endpoint JSON response.
    ///
    /// `access_token` must be present and a string. `token_type`,
    /// `refresh_token` and `scope` default to empty when absent;
    /// `expires_in` parses to `None` when absent or non-numeric.
    ///
    /// This parse is context-free: the requested-scope defaulting rule is
    /// applied by the exchange that knows which scope was requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object or `access_token`
    /// is missing or not a string.
    pub fn from_json(body: &str) -> OAuth2Result<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| OAuth2Error::InvalidTokenResponse(e.to_string()))?;
        let object = value.as_object().ok_or_else(|| {
            OAuth2Error::InvalidTokenResponse("token response is not a JSON object".to_string())
        })?;

        let access_token = object
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or(OAuth2Error::MissingTokenField("access_token"))?;
        let string_field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            access_token: access_token.to_string(),
            token_type: string_field("token_type"),
            refresh_token: string_field("refresh_token"),
            expires_in: object.get("expires_in").and_then(Value::as_i64),
            scope: string_field("scope"),
        })
    }

    /// Returns true when an access token is present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// The access token, empty when invalid.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The token type reported by the server, informational only.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// The refresh token, empty when the server issued none.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Expiry in seconds, `None` when the server did not provide one.
    #[must_use]
    pub const fn expires_in(&self) -> Option<i64> {
        self.expires_in
    }

    /// The granted scope, empty when unknown.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Replaces the refresh token.
    pub fn set_refresh_token(&mut self, refresh_token: impl Into<String>) {
        self.refresh_token = refresh_token.into();
    }

    /// Replaces the granted scope.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }
}
