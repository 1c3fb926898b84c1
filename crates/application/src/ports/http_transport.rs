//! HTTP transport port

use async_trait::async_trait;
use thiserror::Error;
use tern_domain::{RequestDescriptor, TransportResponse};

/// Transport-level failures.
///
/// A non-success HTTP status is not a transport error: it is delivered as a
/// normal [`TransportResponse`]. These variants cover the cases where no
/// response was received at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request was cancelled before completion.
    #[error("request was cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for dispatching HTTP requests.
///
/// The OAuth2 engine performs all its network round-trips through this trait,
/// so the flows can be exercised against an in-memory double and the real
/// client can inject whatever stack it already uses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and resolves with the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received; responses
    /// with non-success statuses resolve normally.
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse, TransportError>;
}
