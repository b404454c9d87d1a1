//! Transport gateway shared by every API module.
//!
//! The gateway owns the cross-cutting request policy:
//!
//! 1. attach `Authorization: Bearer <token>` when the store holds a token;
//! 2. on a 2xx reply, persist any rotated `Bearer` token before looking at
//!    the body;
//! 3. unwrap the `{code, enumCode, message, data}` envelope, or pass
//!    non-enveloped bodies through;
//! 4. turn every failure into an [`ApiError`], clearing the token for
//!    `TOKEN_EXPIRED`/`TOKEN_INVALID` and emitting exactly one notice.
//!
//! It never retries and never swallows a failure.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{ResponseBody, ResponseEnvelope};
use super::ports::{
    ErrorNotifier, HttpMethod, HttpTransport, RequestBody, TokenStore, TransportFailure,
    TransportRequest, TransportResponse,
};
use super::{ApiError, Token};

/// Payload type for operations whose reply carries nothing of interest.
///
/// Accepts any `data` value, including `null`.
pub type NoContent = serde::de::IgnoredAny;

/// HTTP gateway applying auth, envelope and error policy.
pub struct ApiGateway {
    transport: Arc<dyn HttpTransport>,
    token_store: Arc<dyn TokenStore>,
    notifier: Arc<dyn ErrorNotifier>,
}

impl ApiGateway {
    /// Assemble a gateway from its ports.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        token_store: Arc<dyn TokenStore>,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        Self {
            transport,
            token_store,
            notifier,
        }
    }

    /// Store the gateway reads and rotates tokens in.
    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    /// Dispatch `request` and return the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for envelope rejections, non-2xx replies and
    /// transport failures. The notifier has already been called once.
    pub async fn execute(&self, mut request: TransportRequest) -> Result<Value, ApiError> {
        let token = self.token_store.get();
        if !token.is_empty() {
            request.authorization = Some(token.bearer_header_value());
        }
        debug!(method = %request.method, path = %request.path, "dispatching request");
        match self.transport.send(request).await {
            Ok(response) => self.handle_response(response),
            Err(failure) => Err(self.fail(classify_failure(failure))),
        }
    }

    /// Dispatch and decode the payload into `T`.
    ///
    /// # Errors
    ///
    /// As [`ApiGateway::execute`]; a payload that does not match `T` is a
    /// transport-class error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let request = TransportRequest::new(method, path).with_body(body);
        let data = self.execute(request).await?;
        serde_json::from_value(data).map_err(|error| {
            self.fail(ApiError::transport(format!(
                "unexpected response payload from {path}: {error}"
            )))
        })
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Get, path, RequestBody::Empty).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(HttpMethod::Post, path, body).await
    }

    /// `POST path` without a body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Post, path, RequestBody::Empty).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.json_body(body)?;
        self.request(HttpMethod::Patch, path, body).await
    }

    /// `PATCH path` with a `text/plain` body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn patch_text<T: DeserializeOwned>(
        &self,
        path: &str,
        text: impl Into<String>,
    ) -> Result<T, ApiError> {
        self.request(HttpMethod::Patch, path, RequestBody::Text(text.into()))
            .await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Delete, path, RequestBody::Empty)
            .await
    }

    fn json_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<RequestBody, ApiError> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|error| {
                self.fail(ApiError::transport(format!(
                    "could not encode request body: {error}"
                )))
            })
    }

    fn handle_response(&self, response: TransportResponse) -> Result<Value, ApiError> {
        let success = response.is_success();
        if success {
            self.rotate(response.authorization.as_deref());
        }
        match (success, ResponseBody::decode(&response.body)) {
            (true, ResponseBody::Enveloped(envelope)) if envelope.is_success() => {
                Ok(envelope.data)
            }
            (_, ResponseBody::Enveloped(envelope)) => Err(self.reject(envelope)),
            (true, ResponseBody::Raw(value)) => Ok(value),
            (false, ResponseBody::Raw(_)) => Err(self.fail(ApiError::transport(format!(
                "request failed with status code {}",
                response.status
            )))),
        }
    }

    fn rotate(&self, header: Option<&str>) {
        let Some(token) = header.and_then(Token::from_bearer_header) else {
            return;
        };
        debug!("server rotated bearer token");
        if let Err(error) = self.token_store.set(token) {
            warn!(%error, "failed to persist rotated token");
        }
    }

    fn reject(&self, envelope: ResponseEnvelope) -> ApiError {
        let error = envelope.into_error();
        if error.invalidates_token() {
            warn!(
                code = error.code(),
                enum_code = error.enum_code().unwrap_or_default(),
                "server invalidated the session token"
            );
            if let Err(store_error) = self.token_store.clear() {
                warn!(error = %store_error, "failed to clear invalidated token");
            }
        }
        self.fail(error)
    }

    fn fail(&self, error: ApiError) -> ApiError {
        self.notifier.notify(error.message());
        error
    }
}

fn classify_failure(failure: TransportFailure) -> ApiError {
    match failure {
        TransportFailure::Timeout { .. } => ApiError::timeout(),
        TransportFailure::Connection { message } => ApiError::transport(message),
        TransportFailure::Unknown => ApiError::unknown(),
    }
}
