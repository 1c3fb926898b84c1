//! OAuth2 token lifecycle
//!
//! Authorization request URIs with anti-forgery state, redirect callback
//! parsing, token exchange over the injected transport, and per-request
//! credential injection.

pub mod authorizer;
pub mod codec;
mod config;

pub use authorizer::{authorize_request, resolve};
pub use codec::ExchangeGrant;
pub use config::OAuth2Config;
