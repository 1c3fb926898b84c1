//! Grant codec
//!
//! Pure encoding and decoding for the OAuth2 wire formats: authorization
//! request URIs, form-encoded token request bodies, redirect callback
//! parameters, and the credentials used to authenticate against the token
//! endpoint. Nothing here performs I/O or touches client state.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngCore;
use serde::Deserialize;
use tern_domain::{GrantKind, OAuth2Error, OAuth2Result, TransportResponse};
use url::Url;

/// Content-Type for form-urlencoded data.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// RFC 3986 query-component encoding.
///
/// Unreserved characters, sub-delimiters, and the extra query characters
/// `:` `/` `?` `@` pass through untouched; `&`, `=`, `+` and `#` stay
/// escaped so an encoded value can never break the parameter structure.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b',')
    .remove(b';')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'@');

/// Number of random bytes behind a generated state value, 192 bits.
const STATE_ENTROPY_BYTES: usize = 24;

/// Percent-encodes a value for use inside a URI query component.
#[must_use]
pub fn encode_query_component(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, QUERY_COMPONENT).into()
}

/// Generates a fresh anti-forgery state value.
///
/// The value is drawn from the thread-local CSPRNG and rendered with the
/// URL-safe base64 alphabet, so it needs no further encoding.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0_u8; STATE_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Builds the authorization request URI for the given endpoint and grant.
///
/// Parameters appear in a fixed order: `response_type`, `client_id`,
/// `redirect_uri`, `state`, then `scope` only when non-empty. Empty values
/// render as empty so the output is stable for partially filled
/// configurations. An empty or relative endpoint yields a root-relative URI.
#[must_use]
pub fn build_authorization_uri(
    endpoint: &str,
    grant: GrantKind,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    scope: &str,
) -> String {
    let mut query = format!(
        "response_type={}&client_id={}&redirect_uri={}&state={}",
        grant.response_type(),
        encode_query_component(client_id),
        encode_query_component(redirect_uri),
        encode_query_component(state),
    );
    if !scope.is_empty() {
        query.push_str("&scope=");
        query.push_str(&encode_query_component(scope));
    }

    match Url::parse(endpoint) {
        // Url normalizes an authority-only endpoint to a root path, so
        // "https://foo" becomes "https://foo/?...".
        Ok(url) if url.query().is_some() => format!("{url}&{query}"),
        Ok(url) => format!("{url}?{query}"),
        Err(_) => format!("{endpoint}/?{query}"),
    }
}

/// The `Authorization: Basic` header value for a client id and secret.
#[must_use]
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{client_id}:{client_secret}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// A token-endpoint grant with the data needed to form its request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeGrant {
    /// Exchange a one-time authorization code.
    AuthorizationCode {
        /// The code from the redirect callback.
        code: String,
        /// The redirect URI registered for this client.
        redirect_uri: String,
    },
    /// Exchange a refresh token for a fresh access token.
    RefreshToken {
        /// The refresh token currently held.
        refresh_token: String,
        /// The configured scope, empty to request the previous scope.
        scope: String,
    },
    /// Authenticate directly with the client credentials.
    ClientCredentials {
        /// The configured scope, empty for the server default.
        scope: String,
    },
}

impl ExchangeGrant {
    /// The `grant_type` parameter value for this grant.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
            Self::ClientCredentials { .. } => "client_credentials",
        }
    }

    /// Returns true for the refresh grant.
    #[must_use]
    pub const fn is_refresh(&self) -> bool {
        matches!(self, Self::RefreshToken { .. })
    }

    /// Encodes the form body for this grant.
    ///
    /// Fields appear in the order the protocol examples fix: `grant_type`
    /// first, the grant's own parameters next, and the client credentials
    /// last when they travel in the body instead of a Basic header.
    ///
    /// # Errors
    ///
    /// Returns a network-class error if the form encoding fails.
    pub fn form_body(&self, body_credentials: Option<(&str, &str)>) -> OAuth2Result<String> {
        let mut pairs: Vec<(&str, &str)> = vec![("grant_type", self.grant_type())];
        match self {
            Self::AuthorizationCode { code, redirect_uri } => {
                pairs.push(("code", code));
                pairs.push(("redirect_uri", redirect_uri));
            }
            Self::RefreshToken {
                refresh_token,
                scope,
            } => {
                pairs.push(("refresh_token", refresh_token));
                if !scope.is_empty() {
                    pairs.push(("scope", scope));
                }
            }
            Self::ClientCredentials { scope } => {
                if !scope.is_empty() {
                    pairs.push(("scope", scope));
                }
            }
        }
        if let Some((client_id, client_secret)) = body_credentials {
            pairs.push(("client_id", client_id));
            pairs.push(("client_secret", client_secret));
        }

        serde_urlencoded::to_string(&pairs)
            .map_err(|e| OAuth2Error::Network(format!("failed to encode form body: {e}")))
    }
}

/// The structured error body of RFC 6749 §5.2.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Maps a non-success token-endpoint response to an error.
///
/// A parsable OAuth2 error body surfaces as a protocol-class error carrying
/// the server's `error` code; anything else is reported as the bare HTTP
/// status.
#[must_use]
pub fn error_from_response(response: &TransportResponse) -> OAuth2Error {
    serde_json::from_slice::<ErrorBody>(&response.body).map_or(
        OAuth2Error::Http {
            status: response.status.as_u16(),
        },
        |body| OAuth2Error::AuthorizationDeclined {
            error: body.error,
            description: body.error_description,
        },
    )
}

/// Decoded parameters from the query component of a redirect URI.
#[must_use]
pub fn query_params(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Decoded parameters from the fragment component of a redirect URI.
#[must_use]
pub fn fragment_params(url: &Url) -> Vec<(String, String)> {
    url.fragment()
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

/// Looks up the first parameter with the given key.
#[must_use]
pub fn find_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(existing, _)| existing == key)
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_component_keeps_uri_characters() {
        assert_eq!(
            encode_query_component("http://localhost:8080"),
            "http://localhost:8080"
        );
        assert_eq!(encode_query_component("a b&c=d"), "a%20b%26c%3Dd");
    }

    #[test]
    fn test_generate_state_is_unguessable_and_url_safe() {
        let first = generate_state();
        let second = generate_state();
        assert_ne!(first, second);
        // 24 bytes of entropy render to 32 base64 characters.
        assert_eq!(first.len(), 32);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_authorization_uri_with_empty_endpoint() {
        let uri = build_authorization_uri(
            "",
            GrantKind::AuthorizationCode,
            "",
            "",
            "xyzzy",
            "",
        );
        assert_eq!(uri, "/?response_type=code&client_id=&redirect_uri=&state=xyzzy");
    }

    #[test]
    fn test_authorization_uri_appends_to_existing_query() {
        let uri = build_authorization_uri(
            "https://foo/authorize?tenant=main",
            GrantKind::AuthorizationCode,
            "abc",
            "",
            "s",
            "",
        );
        assert_eq!(
            uri,
            "https://foo/authorize?tenant=main&response_type=code&client_id=abc&redirect_uri=&state=s"
        );
    }

    #[test]
    fn test_basic_authorization_encoding() {
        assert_eq!(
            basic_authorization("123ABC", "456DEF"),
            "Basic MTIzQUJDOjQ1NkRFRg=="
        );
    }

    #[test]
    fn test_code_grant_body() {
        let grant = ExchangeGrant::AuthorizationCode {
            code: "789GHI".to_string(),
            redirect_uri: "https://bar".to_string(),
        };
        assert_eq!(
            grant.form_body(None).unwrap(),
            "grant_type=authorization_code&code=789GHI&redirect_uri=https%3A%2F%2Fbar"
        );
    }

    #[test]
    fn test_code_grant_body_with_client_credentials() {
        let grant = ExchangeGrant::AuthorizationCode {
            code: "789GHI".to_string(),
            redirect_uri: "https://bar".to_string(),
        };
        assert_eq!(
            grant.form_body(Some(("123ABC", "456DEF"))).unwrap(),
            "grant_type=authorization_code&code=789GHI&redirect_uri=https%3A%2F%2Fbar&client_id=123ABC&client_secret=456DEF"
        );
    }

    #[test]
    fn test_refresh_grant_body_omits_empty_scope() {
        let grant = ExchangeGrant::RefreshToken {
            refresh_token: "refreshing".to_string(),
            scope: String::new(),
        };
        assert_eq!(
            grant.form_body(None).unwrap(),
            "grant_type=refresh_token&refresh_token=refreshing"
        );
    }

    #[test]
    fn test_refresh_grant_body_with_scope() {
        let grant = ExchangeGrant::RefreshToken {
            refresh_token: "BAZ".to_string(),
            scope: "xyzzy".to_string(),
        };
        assert_eq!(
            grant.form_body(None).unwrap(),
            "grant_type=refresh_token&refresh_token=BAZ&scope=xyzzy"
        );
    }

    #[test]
    fn test_client_credentials_body() {
        let grant = ExchangeGrant::ClientCredentials {
            scope: "read write".to_string(),
        };
        assert_eq!(
            grant.form_body(Some(("id", "secret"))).unwrap(),
            "grant_type=client_credentials&scope=read+write&client_id=id&client_secret=secret"
        );
    }

    #[test]
    fn test_error_from_structured_body() {
        let response = TransportResponse::new(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"code expired"}"#);
        assert_eq!(
            error_from_response(&response),
            OAuth2Error::AuthorizationDeclined {
                error: "invalid_grant".to_string(),
                description: Some("code expired".to_string()),
            }
        );
    }

    #[test]
    fn test_error_from_opaque_body() {
        let response = TransportResponse::new(503).with_body("upstream unavailable");
        assert_eq!(
            error_from_response(&response),
            OAuth2Error::Http { status: 503 }
        );
    }

    #[test]
    fn test_fragment_params() {
        let url = Url::parse("http://localhost/#access_token=abcd1234&state=xyzzy").unwrap();
        let params = fragment_params(&url);
        assert_eq!(find_param(&params, "access_token"), Some("abcd1234"));
        assert_eq!(find_param(&params, "state"), Some("xyzzy"));
        assert_eq!(find_param(&params, "code"), None);
    }

    #[test]
    fn test_fragment_params_without_fragment() {
        let url = Url::parse("http://localhost/?code=sesame").unwrap();
        assert!(fragment_params(&url).is_empty());
    }
}
