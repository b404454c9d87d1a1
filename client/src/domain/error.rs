//! Unified API error surfaced by every remote operation.
//!
//! Server rejections, broken transports, timeouts and failures with no
//! diagnostics all collapse into one [`ApiError`] shape so callers keep a
//! single error path. The [`ApiErrorKind`] and the reserved
//! [`SENTINEL_CODE`] still let a caller tell "the server said no" apart from
//! "the server could not be reached".

use thiserror::Error;

/// Numeric code reserved for failures that did not come from the server.
pub const SENTINEL_CODE: i64 = -1;

/// Fallback message when a server rejection carries no text.
pub const REQUEST_FAILED_MESSAGE: &str = "request failed";
/// Fixed message for client-side timeouts.
pub const TIMEOUT_MESSAGE: &str = "request timed out";
/// Message used when nothing else is known about a failure.
pub const NETWORK_ERROR_MESSAGE: &str = "network error";

/// Enum code sent when the bearer token has expired.
pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
/// Enum code sent when the bearer token is not recognised.
pub const TOKEN_INVALID: &str = "TOKEN_INVALID";

/// Origin of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The server rejected the request with an envelope code.
    Domain,
    /// The client stopped waiting for a reply.
    Timeout,
    /// Connectivity or protocol failure with only a message.
    Transport,
    /// No diagnostic information was available.
    Unknown,
}

/// Error returned by the gateway for every failed call.
///
/// ## Invariants
/// - `code` is [`SENTINEL_CODE`] unless `kind` is [`ApiErrorKind::Domain`].
/// - `enum_code` is only ever set for domain errors.
///
/// # Examples
/// ```
/// use flashcourt::domain::{ApiError, ApiErrorKind, SENTINEL_CODE};
///
/// let err = ApiError::domain("expired", 401, Some("TOKEN_EXPIRED".to_owned()));
/// assert!(err.invalidates_token());
/// assert_eq!(err.code(), 401);
///
/// let timeout = ApiError::timeout();
/// assert_eq!(timeout.kind(), ApiErrorKind::Timeout);
/// assert_eq!(timeout.code(), SENTINEL_CODE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    code: i64,
    enum_code: Option<String>,
}

impl ApiError {
    /// Server rejection carrying the envelope's code and discriminator.
    ///
    /// A blank message is replaced with [`REQUEST_FAILED_MESSAGE`].
    pub fn domain(message: impl Into<String>, code: i64, enum_code: Option<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            REQUEST_FAILED_MESSAGE.to_owned()
        } else {
            message
        };
        Self {
            kind: ApiErrorKind::Domain,
            message,
            code,
            enum_code,
        }
    }

    /// Client-side timeout.
    #[must_use]
    pub fn timeout() -> Self {
        Self::sentinel(ApiErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    /// Transport failure described only by `message`.
    ///
    /// A blank message degrades to [`ApiError::unknown`].
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::unknown();
        }
        Self::sentinel(ApiErrorKind::Transport, message)
    }

    /// Failure with no diagnostic information.
    #[must_use]
    pub fn unknown() -> Self {
        Self::sentinel(ApiErrorKind::Unknown, NETWORK_ERROR_MESSAGE)
    }

    fn sentinel(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: SENTINEL_CODE,
            enum_code: None,
        }
    }

    /// Origin of the failure.
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Human-readable message, also used for the user-facing notice.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Server code, or [`SENTINEL_CODE`] for non-domain failures.
    #[must_use]
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Stable machine-readable discriminator sent by the server.
    #[must_use]
    pub fn enum_code(&self) -> Option<&str> {
        self.enum_code.as_deref()
    }

    /// Whether the server rejected the request (as opposed to the request
    /// never completing).
    #[must_use]
    pub fn is_domain(&self) -> bool {
        self.kind == ApiErrorKind::Domain
    }

    /// Whether the error carries an enum code that invalidates the token.
    #[must_use]
    pub fn invalidates_token(&self) -> bool {
        self.enum_code().is_some_and(invalidates_token)
    }
}

/// Whether `enum_code` forces re-authentication.
#[must_use]
pub fn invalidates_token(enum_code: &str) -> bool {
    matches!(enum_code, TOKEN_EXPIRED | TOKEN_INVALID)
}
