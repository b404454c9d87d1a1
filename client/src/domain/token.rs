//! Bearer token and role primitives.
//!
//! A [`Token`] is an opaque bearer credential. The empty token means
//! "unauthenticated". The [`Role`] is never stored on its own; it is decoded
//! from the token's claims every time it is needed.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value;
use zeroize::Zeroizing;

const BEARER_PREFIX: &str = "Bearer ";

const CLAIMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Opaque bearer credential.
///
/// ## Invariants
/// - The empty string is the unauthenticated token.
/// - The secret is zeroed on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use flashcourt::Token;
///
/// let token = Token::new("abc.def.ghi");
/// assert!(!token.is_empty());
/// assert_eq!(token.bearer_header_value(), "Bearer abc.def.ghi");
/// assert!(Token::empty().is_empty());
/// ```
#[derive(Clone)]
pub struct Token(Zeroizing<String>);

impl Token {
    /// Wrap a raw credential string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// The unauthenticated token.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this is the unauthenticated token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw credential string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `Authorization` header value carrying this token.
    #[must_use]
    pub fn bearer_header_value(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.as_str())
    }

    /// Extract a rotated token from a response `Authorization` header.
    ///
    /// Returns `None` unless the value starts with `Bearer `. The remainder is
    /// trimmed and trusted as-is.
    ///
    /// ```
    /// use flashcourt::Token;
    ///
    /// let rotated = Token::from_bearer_header("Bearer  next-token ").expect("bearer");
    /// assert_eq!(rotated.as_str(), "next-token");
    /// assert!(Token::from_bearer_header("Basic abc").is_none());
    /// ```
    #[must_use]
    pub fn from_bearer_header(value: &str) -> Option<Self> {
        value
            .strip_prefix(BEARER_PREFIX)
            .map(|credential| Self::new(credential.trim()))
    }

    /// Role embedded in this token's claims.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::of(self.as_str())
    }
}

impl Default for Token {
    fn default() -> Self {
        Self(Zeroizing::new(String::new()))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Token(<empty>)")
        } else {
            f.write_str("Token(<redacted>)")
        }
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Authorisation tier decoded from token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Regular student account.
    User,
    /// Administrator account.
    Admin,
    /// No token, or claims that could not be decoded.
    #[default]
    Unknown,
}

impl Role {
    /// Decode the role from a raw token.
    ///
    /// The token must have exactly three `.`-separated segments; the middle
    /// one is base64url JSON with a `role` field of `USER` or `ADMIN`. Every
    /// other input yields [`Role::Unknown`].
    ///
    /// ```
    /// use flashcourt::Role;
    ///
    /// // {"role":"ADMIN"}
    /// assert_eq!(Role::of("h.eyJyb2xlIjoiQURNSU4ifQ.s"), Role::Admin);
    /// assert_eq!(Role::of("not-a-token"), Role::Unknown);
    /// ```
    #[must_use]
    pub fn of(token: &str) -> Self {
        decode_claims(token)
            .as_ref()
            .and_then(|claims| claims.get("role"))
            .and_then(Value::as_str)
            .map_or(Self::Unknown, Self::from_claim)
    }

    /// Whether this is [`Role::Admin`].
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire spelling of the role; empty for [`Role::Unknown`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Unknown => "",
        }
    }

    fn from_claim(claim: &str) -> Self {
        match claim {
            "USER" => Self::User,
            "ADMIN" => Self::Admin,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_claims(token: &str) -> Option<Value> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    if payload.is_empty() {
        return None;
    }
    // Tolerate standard-alphabet payloads as well as base64url.
    let normalised = payload.replace('+', "-").replace('/', "_");
    let bytes = CLAIMS_ENGINE.decode(normalised.as_bytes()).ok()?;
    serde_json::from_slice::<Value>(&bytes).ok()
}
