//! Reqwest-backed HTTP transport.
//!
//! This adapter owns transport details only: URL assembly, header and body
//! encoding, the global request timeout and mapping reqwest failures. Status
//! codes and bodies are handed back untouched for the gateway to classify.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, Url};

use crate::domain::ports::{
    HttpMethod, HttpTransport, RequestBody, TransportFailure, TransportRequest, TransportResponse,
};

/// Global request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Transport sending every request relative to one base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Build a transport using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportFailure> {
        join_path(&self.base_url, path)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let url = self.endpoint(&request.path)?;
        let mut builder = self.client.request(method_of(request.method), url);
        if let Some(authorization) = request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Text(text) => builder.header(CONTENT_TYPE, "text/plain").body(text),
        };

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let authorization = authorization_header(response.headers());
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(TransportResponse {
            status,
            authorization,
            body: body.to_vec(),
        })
    }
}

/// Append `path` to `base` the way a string base URL prefix would.
///
/// `Url::join` would drop any path segment of the base, so the two are
/// concatenated instead.
fn join_path(base: &Url, path: &str) -> Result<Url, TransportFailure> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|error| TransportFailure::connection(format!("invalid request URL {joined}: {error}")))
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn map_transport_error(error: reqwest::Error) -> TransportFailure {
    let message = error.to_string();
    if error.is_timeout() {
        TransportFailure::timeout(message)
    } else if message.trim().is_empty() {
        TransportFailure::unknown()
    } else {
        TransportFailure::connection(message)
    }
}
