//! Response shapes shared by both sides of a route contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base shape of every response variant: `{ "statusCode": .., "body": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResult<B = Value> {
    pub status_code: u16,
    pub body: B,
}

impl<B> HttpResult<B> {
    pub fn new(status_code: u16, body: B) -> Self {
        Self { status_code, body }
    }
}

impl HttpResult<Value> {
    /// Read the `{statusCode, body}` shape out of an arbitrary JSON value.
    ///
    /// A missing `body` is read as `null`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let status_code = value.get("statusCode")?.as_u64()?;
        let status_code = u16::try_from(status_code).ok()?;
        let body = value.get("body").cloned().unwrap_or(Value::Null);
        Some(Self { status_code, body })
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "statusCode": self.status_code,
            "body": self.body,
        })
    }
}

/// Body of the reserved generic 500 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub error_message: String,
}

/// Universal fallback response: status 500 with `{ "errorMessage": .. }`.
pub type GenericInternalServerError = HttpResult<ErrorMessage>;

/// Status code of [`GenericInternalServerError`].
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Build the generic 500 response for a failure message.
pub fn internal_server_error(message: impl Into<String>) -> GenericInternalServerError {
    HttpResult::new(
        INTERNAL_SERVER_ERROR,
        ErrorMessage {
            error_message: message.into(),
        },
    )
}

/// Recognize the reserved 500 shape from a raw status and body.
///
/// Returns the typed response when `status` is exactly 500 and `body` is an
/// object with a string `errorMessage` field. Other fields are dropped.
pub fn as_generic_internal_server_error(
    status: u16,
    body: &Value,
) -> Option<GenericInternalServerError> {
    if status != INTERNAL_SERVER_ERROR {
        return None;
    }
    let message = body.as_object()?.get("errorMessage")?.as_str()?;
    Some(internal_server_error(message))
}

/// True for a `{statusCode: 500, body: {errorMessage: string}}` value.
pub fn is_generic_internal_server_error(value: &Value) -> bool {
    HttpResult::from_value(value)
        .and_then(|r| as_generic_internal_server_error(r.status_code, &r.body))
        .is_some()
}

/// Successful outcome of an outbound call.
///
/// The generic 500 is a recognized result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<R> {
    /// The response matched the route's return schema.
    Declared(R),
    /// The server answered with the reserved generic 500 shape.
    InternalError(GenericInternalServerError),
}

impl<R> Reply<R> {
    pub fn declared(self) -> Option<R> {
        match self {
            Self::Declared(r) => Some(r),
            Self::InternalError(_) => None,
        }
    }

    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::InternalError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_result_wire_shape() {
        let r = HttpResult::new(200, json!({"name": "ada"}));
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"statusCode": 200, "body": {"name": "ada"}})
        );
        assert_eq!(r.to_value(), serde_json::to_value(&r).unwrap());
    }

    #[test]
    fn test_from_value_requires_status_code() {
        assert!(HttpResult::from_value(&json!({"body": {}})).is_none());
        assert!(HttpResult::from_value(&json!({"statusCode": "200"})).is_none());
        assert!(HttpResult::from_value(&json!({"statusCode": 70000})).is_none());

        let r = HttpResult::from_value(&json!({"statusCode": 204})).unwrap();
        assert_eq!(r.status_code, 204);
        assert_eq!(r.body, Value::Null);
    }

    #[test]
    fn test_generic_internal_server_error_detection() {
        let body = json!({"errorMessage": "db down", "trace": "x"});
        let e = as_generic_internal_server_error(500, &body).unwrap();
        assert_eq!(e.body.error_message, "db down");
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({"statusCode": 500, "body": {"errorMessage": "db down"}})
        );

        assert!(as_generic_internal_server_error(502, &body).is_none());
        assert!(as_generic_internal_server_error(500, &json!({"errorMessage": 1})).is_none());
        assert!(as_generic_internal_server_error(500, &json!("db down")).is_none());
        assert!(as_generic_internal_server_error(500, &Value::Null).is_none());
    }

    #[test]
    fn test_is_generic_internal_server_error_on_wire_shape() {
        let wire = serde_json::to_value(internal_server_error("boom")).unwrap();
        assert!(is_generic_internal_server_error(&wire));
        assert!(!is_generic_internal_server_error(&json!({"statusCode": 500, "body": {}})));
        assert!(!is_generic_internal_server_error(&json!({"errorMessage": "boom"})));
    }
}
