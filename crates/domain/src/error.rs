//! OAuth2 error taxonomy

use thiserror::Error;

/// Errors surfaced by the OAuth2 flow engine.
///
/// Variants fall into four classes: security (state validation), protocol
/// (malformed redirects and token responses), network (transport failures and
/// unexpected HTTP statuses), and configuration (operations attempted without
/// the data they need).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OAuth2Error {
    /// The `state` echoed by the authorization server does not match the
    /// state this client generated. The redirect must be rejected.
    #[error("redirected URI state does not match the expected state")]
    StateMismatch,

    /// The redirected URI is missing a required parameter or cannot be parsed.
    #[error("malformed redirect: {0}")]
    MalformedRedirect(String),

    /// The token response lacks a required field, or the field has the wrong
    /// type.
    #[error("token response is missing required field `{0}`")]
    MissingTokenField(&'static str),

    /// The token response body is not a JSON object.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// The token endpoint answered with a structured OAuth2 error body.
    #[error("token endpoint declined the request: {error}")]
    AuthorizationDeclined {
        /// The `error` code from the response body.
        error: String,
        /// The optional `error_description` from the response body.
        description: Option<String>,
    },

    /// The token endpoint answered with a non-success status and no
    /// recognizable OAuth2 error body.
    #[error("token endpoint returned HTTP {status}")]
    Http {
        /// The HTTP status code of the response.
        status: u16,
    },

    /// The HTTP transport failed before a response was received.
    #[error("network error: {0}")]
    Network(String),

    /// A refresh was requested but no refresh token is stored.
    #[error("no refresh token is available")]
    MissingRefreshToken,

    /// The configuration cannot support the requested operation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for OAuth2 operations.
pub type OAuth2Result<T> = Result<T, OAuth2Error>;
