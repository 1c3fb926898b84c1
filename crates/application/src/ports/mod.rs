//! Port definitions (interfaces)
//!
//! Ports define the boundary between the OAuth2 engine and external systems.
//! Each port is a trait implemented by an adapter in the infrastructure
//! layer, or by an in-memory double in tests.

mod http_transport;

pub use http_transport::{HttpTransport, TransportError};
