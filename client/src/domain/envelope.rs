//! Response body decoding at the transport boundary.
//!
//! The server wraps most replies in `{code, enumCode, message, data}`, but
//! not all of them. [`ResponseBody::decode`] tells the two apart once, so
//! later stages match on a tagged union instead of probing JSON.

use serde_json::{Map, Value};

use super::{ApiError, SENTINEL_CODE};

/// Envelope code meaning success.
pub const SUCCESS_CODE: i64 = 200;

/// The server's standard reply wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    /// Outcome code; [`SUCCESS_CODE`] on success.
    pub code: i64,
    /// Machine-readable discriminator, when the server sent one.
    pub enum_code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Payload; meaningful only on success.
    pub data: Value,
}

impl ResponseEnvelope {
    /// Whether `code` is [`SUCCESS_CODE`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Domain error described by this envelope.
    #[must_use]
    pub fn into_error(self) -> ApiError {
        let enum_code = self.enum_code.filter(|value| !value.is_empty());
        ApiError::domain(self.message.unwrap_or_default(), self.code, enum_code)
    }

    fn from_object(mut object: Map<String, Value>) -> Result<Self, Map<String, Value>> {
        let Some(code) = object.get("code").and_then(envelope_code) else {
            return Err(object);
        };
        let text = |value: Option<Value>| match value {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };
        Ok(Self {
            code,
            enum_code: text(object.remove("enumCode")),
            message: text(object.remove("message")),
            data: object.remove("data").unwrap_or(Value::Null),
        })
    }
}

/// 2^63; every integral float below it in magnitude fits an `i64`.
const I64_SPAN: f64 = 9_223_372_036_854_775_808.0;

/// Numeric `code` as an integer.
///
/// Integral floats such as `401.0` keep their value. Any other number maps
/// to [`SENTINEL_CODE`] so it can never read as success.
fn envelope_code(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(code) = number.as_i64() {
        return Some(code);
    }
    let integral = number
        .as_f64()
        .filter(|code| code.fract() == 0.0 && code.abs() < I64_SPAN)
        .map(|code| code as i64);
    Some(integral.unwrap_or(SENTINEL_CODE))
}

/// A decoded reply body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON object carrying a numeric `code`.
    Enveloped(ResponseEnvelope),
    /// Anything else, passed through untouched.
    Raw(Value),
}

impl ResponseBody {
    /// Classify raw body bytes.
    ///
    /// - empty or whitespace-only → `Raw(null)`
    /// - not JSON → `Raw(string)` with the lossy UTF-8 text
    /// - object with a numeric `code` → `Enveloped`
    /// - any other JSON → `Raw(value)`
    ///
    /// # Examples
    /// ```
    /// use flashcourt::domain::ResponseBody;
    /// use serde_json::json;
    ///
    /// let body = ResponseBody::decode(br#"{"code":200,"data":"t-1"}"#);
    /// assert!(matches!(body, ResponseBody::Enveloped(ref e) if e.data == json!("t-1")));
    ///
    /// let raw = ResponseBody::decode(br#"{"foo":1}"#);
    /// assert_eq!(raw, ResponseBody::Raw(json!({"foo": 1})));
    /// ```
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Raw(Value::Null);
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => match ResponseEnvelope::from_object(object) {
                Ok(envelope) => Self::Enveloped(envelope),
                Err(object) => Self::Raw(Value::Object(object)),
            },
            Ok(other) => Self::Raw(other),
            Err(_) => Self::Raw(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        }
    }

    /// The envelope, if this body is one.
    #[must_use]
    pub fn into_envelope(self) -> Option<ResponseEnvelope> {
        match self {
            Self::Enveloped(envelope) => Some(envelope),
            Self::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn decodes_full_envelope() {
        let body = ResponseBody::decode(
            br#"{"code":401,"enumCode":"TOKEN_EXPIRED","message":"m","data":null}"#,
        );
        let envelope = body.into_envelope().expect("envelope");
        assert_eq!(envelope.code, 401);
        assert_eq!(envelope.enum_code.as_deref(), Some("TOKEN_EXPIRED"));
        assert_eq!(envelope.message.as_deref(), Some("m"));
        assert!(!envelope.is_success());
    }

    #[rstest]
    #[case::integral_float(br#"{"code":401.0,"enumCode":"TOKEN_EXPIRED","message":"m"}"#.as_slice(), 401)]
    #[case::success_float(br#"{"code":200.0,"data":"t-1"}"#.as_slice(), 200)]
    #[case::fractional(br#"{"code":200.5}"#.as_slice(), SENTINEL_CODE)]
    #[case::beyond_i64(br#"{"code":18446744073709551615}"#.as_slice(), SENTINEL_CODE)]
    fn any_numeric_code_is_an_envelope(#[case] bytes: &[u8], #[case] code: i64) {
        let envelope = ResponseBody::decode(bytes)
            .into_envelope()
            .expect("numeric code should mark an envelope");
        assert_eq!(envelope.code, code);
    }

    #[test]
    fn missing_data_is_null() {
        let envelope = ResponseBody::decode(br#"{"code":200}"#)
            .into_envelope()
            .expect("envelope");
        assert!(envelope.is_success());
        assert_eq!(envelope.data, Value::Null);
    }

    #[rstest]
    #[case::empty(b"".as_slice(), Value::Null)]
    #[case::whitespace(b"  \n".as_slice(), Value::Null)]
    #[case::object_without_code(br#"{"foo":1}"#.as_slice(), json!({"foo": 1}))]
    #[case::string_code(br#"{"code":"200"}"#.as_slice(), json!({"code": "200"}))]
    #[case::array(b"[1,2]".as_slice(), json!([1, 2]))]
    #[case::boolean(b"true".as_slice(), json!(true))]
    #[case::text(b"plain text".as_slice(), json!("plain text"))]
    fn non_envelopes_pass_through(#[case] bytes: &[u8], #[case] expected: Value) {
        assert_eq!(ResponseBody::decode(bytes), ResponseBody::Raw(expected));
    }

    #[test]
    fn into_error_drops_blank_enum_code() {
        let envelope = ResponseEnvelope {
            code: 500,
            enum_code: Some(String::new()),
            message: None,
            data: Value::Null,
        };
        let err = envelope.into_error();
        assert_eq!(err.code(), 500);
        assert!(err.enum_code().is_none());
        assert_eq!(err.message(), "request failed");
    }
}
