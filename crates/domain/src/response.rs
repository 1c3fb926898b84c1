//! Transport response types

use std::borrow::Cow;

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

/// A response as reported by the HTTP transport.
///
/// Non-success statuses are ordinary responses here; only transport-level
/// failures are reported as errors by the transport port.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Response headers in wire order.
    pub headers: Vec<(String, String)>,
    /// The response body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with the given status and no headers or body.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status: StatusCode::new(status),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body bytes.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
