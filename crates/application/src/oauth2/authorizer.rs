//! Request authorizer
//!
//! The hook the owning HTTP client calls once per outgoing request, right
//! before dispatch. It is synchronous, never performs I/O, and never fails:
//! with no valid token the request passes through untouched. It does not
//! refresh an expired token; refreshing is an explicit caller action.

use tern_domain::{AuthResolution, RequestDescriptor};

use crate::oauth2::codec;
use crate::oauth2::config::OAuth2Config;

/// Decides how the configured credential is attached to a request.
#[must_use]
pub fn resolve(config: &OAuth2Config) -> AuthResolution {
    if !config.is_enabled() {
        return AuthResolution::None;
    }
    if config.bearer_auth() {
        AuthResolution::Header {
            name: "Authorization".to_string(),
            value: format!("Bearer {}", config.token().access_token()),
        }
    } else {
        AuthResolution::QueryParam {
            name: config.access_token_query_key().to_string(),
            value: config.token().access_token().to_string(),
        }
    }
}

/// Rewrites an outgoing request to carry the configured credential.
///
/// A bearer header overwrites any prior `Authorization` value; a query
/// credential is appended after the request's existing parameters.
pub fn authorize_request(config: &OAuth2Config, request: &mut RequestDescriptor) {
    match resolve(config) {
        AuthResolution::None => {}
        AuthResolution::Header { name, value } => request.set_header(name, value),
        AuthResolution::QueryParam { name, value } => request.append_query_pair(
            &codec::encode_query_component(&name),
            &codec::encode_query_component(&value),
        ),
    }
}
