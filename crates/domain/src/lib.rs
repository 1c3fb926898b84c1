//! Tern Domain - Core types for the Tern OAuth2 client
//!
//! This crate defines the domain model shared by the OAuth2 flow engine and
//! the HTTP transport adapters. All types here are pure Rust with no I/O
//! dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;

pub use auth::{AuthResolution, GrantKind, Token};
pub use error::{OAuth2Error, OAuth2Result};
pub use request::{HttpMethod, RequestDescriptor};
pub use response::{StatusCode, TransportResponse};
