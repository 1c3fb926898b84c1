//! Tern Application - OAuth2 flow engine
//!
//! This crate turns the domain types into working OAuth2 flows: it builds
//! authorization URIs, parses redirect callbacks, exchanges codes and
//! refresh tokens at the token endpoint through the [`ports::HttpTransport`]
//! port, and rewrites outgoing requests to carry the stored credential.

pub mod oauth2;
pub mod ports;

pub use oauth2::{ExchangeGrant, OAuth2Config, authorize_request, resolve};
pub use ports::{HttpTransport, TransportError};
