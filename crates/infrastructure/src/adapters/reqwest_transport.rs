//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port using the reqwest
//! library. Redirects are disabled: the OAuth2 flows must see redirect
//! responses and transport-level errors as they are, not follow them.

use async_trait::async_trait;
use reqwest::{Client, Method};
use tern_application::ports::{HttpTransport, TransportError};
use tern_domain::{HttpMethod, RequestDescriptor, StatusCode, TransportResponse};

/// HTTP transport backed by `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings and redirects disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent("Tern/0.1.0")
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a transport around a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to transport errors.
    fn map_error(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = StatusCode::new(response.status().as_u16());
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
