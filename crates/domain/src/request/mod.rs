//! Outgoing request descriptor
//!
//! The descriptor is the unit handed to the HTTP transport: a method, a
//! target URI, a flat ordered header list, and body bytes. The request
//! authorizer rewrites descriptors in place before dispatch.

mod method;

pub use method::HttpMethod;

/// An outgoing HTTP request before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestDescriptor {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The target URI, including any query string.
    pub url: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// The request body bytes.
    pub body: Vec<u8>,
}

impl RequestDescriptor {
    /// Creates a descriptor with no headers and an empty body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, keeping any existing values for the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body bytes.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Sets a header, replacing any prior value of the same name.
    ///
    /// Header names compare case-insensitively.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Appends a query parameter to the target URI.
    ///
    /// Existing query parameters are preserved in order and the new pair is
    /// appended last, before any fragment. `key` and `value` must already be
    /// percent-encoded.
    pub fn append_query_pair(&mut self, key: &str, value: &str) {
        let (target, fragment) = match self.url.find('#') {
            Some(index) => {
                let (target, fragment) = self.url.split_at(index);
                (target.to_string(), Some(fragment.to_string()))
            }
            None => (self.url.clone(), None),
        };

        let separator = if target.contains('?') { '&' } else { '?' };
        let mut url = format!("{target}{separator}{key}={value}");
        if let Some(fragment) = fragment {
            url.push_str(&fragment);
        }
        self.url = url;
    }
}
