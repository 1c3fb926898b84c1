//! Grant selection and credential placement types

use serde::{Deserialize, Serialize};

/// The authorization grant a client is configured for.
///
/// The grant decides both the `response_type` sent to the authorization
/// endpoint and how the redirect callback is interpreted: the authorization
/// code grant carries its parameters in the URI query and requires a token
/// exchange, while the implicit grant delivers the access token directly in
/// the URI fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// Authorization code grant: the redirect carries a one-time code that is
    /// exchanged at the token endpoint.
    #[default]
    AuthorizationCode,
    /// Implicit grant: the redirect fragment carries the access token itself.
    Implicit,
}

impl GrantKind {
    /// The `response_type` parameter value for the authorization request.
    #[must_use]
    pub const fn response_type(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "code",
            Self::Implicit => "token",
        }
    }

    /// Returns true for the implicit grant.
    #[must_use]
    pub const fn is_implicit(self) -> bool {
        matches!(self, Self::Implicit)
    }
}

/// How a credential is attached to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResolution {
    /// No credential is available; the request is sent untouched.
    None,
    /// Set this header on the request, replacing any prior value.
    Header {
        /// Header name (e.g., "Authorization").
        name: String,
        /// Header value (e.g., "Bearer token123").
        value: String,
    },
    /// Append this query parameter to the request URI.
    QueryParam {
        /// Query parameter name.
        name: String,
        /// Query parameter value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_response_type() {
        assert_eq!(GrantKind::AuthorizationCode.response_type(), "code");
        assert_eq!(GrantKind::Implicit.response_type(), "token");
    }

    #[test]
    fn test_default_grant_is_code() {
        assert_eq!(GrantKind::default(), GrantKind::AuthorizationCode);
        assert!(!GrantKind::default().is_implicit());
    }
}
