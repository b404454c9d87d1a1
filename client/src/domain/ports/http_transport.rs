//! Driven port for the raw HTTP exchange beneath the gateway.
//!
//! Adapters only move bytes. Any reply that arrives, whatever its status,
//! is returned as a [`TransportResponse`]; the gateway owns envelope
//! decoding and status classification. [`TransportFailure`] is reserved for
//! exchanges that produced no reply at all.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP verbs used by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// `application/json` body.
    Json(Value),
    /// `text/plain` body.
    Text(String),
}

/// One outgoing request, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Path including any query string, starting with `/`.
    pub path: String,
    /// Full `Authorization` header value, when a token is held.
    pub authorization: Option<String>,
    /// Payload.
    pub body: RequestBody,
}

impl TransportRequest {
    /// Request with no body and no credentials.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            authorization: None,
            body: RequestBody::Empty,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Reply received from the server, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Authorization` response header, if present.
    pub authorization: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

define_port_error! {
    /// Exchanges that produced no reply.
    pub enum TransportFailure {
        /// The client-side timeout elapsed.
        Timeout { message: String } => "request timed out: {message}",
        /// Connection, TLS or protocol failure.
        Connection { message: String } => "{message}",
        /// Failure with no usable diagnostics.
        Unknown => "unknown transport failure",
    }
}

/// Port performing one HTTP exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the reply, or the reason none arrived.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(199, false)]
    #[case(200, true)]
    #[case(204, true)]
    #[case(299, true)]
    #[case(301, false)]
    #[case(401, false)]
    fn success_is_the_2xx_range(#[case] status: u16, #[case] expected: bool) {
        let response = TransportResponse {
            status,
            ..TransportResponse::default()
        };
        assert_eq!(response.is_success(), expected);
    }

    #[test]
    fn request_builder_defaults_to_empty_body() {
        let request = TransportRequest::new(HttpMethod::Get, "/user/me");
        assert_eq!(request.body, RequestBody::Empty);
        assert!(request.authorization.is_none());
    }
}
