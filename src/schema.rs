//! Schemas: pure predicates that double as type witnesses.
//!
//! A [`Schema<T>`] accepts a JSON value only when its predicate holds *and*
//! the value deserializes into `T`, so [`Schema::narrow`] never hands back a
//! value of the wrong shape.
//!
//! # Example
//!
//! ```
//! use route_contract::response::HttpResult;
//! use route_contract::schema::{self, Schema};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let found: Schema<HttpResult<User>> = schema::status(200);
//! assert!(found.accepts(&json!({"statusCode": 200, "body": {"name": "ada"}})));
//! assert!(!found.accepts(&json!({"statusCode": 404, "body": {"name": "ada"}})));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::response::{ErrorMessage, GenericInternalServerError, HttpResult, INTERNAL_SERVER_ERROR};

/// Shared predicate type.
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A pure, total classifier for JSON values of shape `T`.
pub struct Schema<T> {
    predicate: Predicate,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned + 'static> Schema<T> {
    /// Accept exactly the values that deserialize into `T`.
    pub fn typed() -> Self {
        Self::new(|_| true)
    }

    /// Accept values satisfying `predicate` that also deserialize into `T`.
    ///
    /// The predicate must be pure and must not panic.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(move |value| predicate(value) && T::deserialize(value).is_ok()),
            _marker: PhantomData,
        }
    }

    /// Narrow this schema with an additional predicate.
    pub fn refine<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let inner = self.predicate;
        Self {
            predicate: Arc::new(move |value| inner(value) && predicate(value)),
            _marker: PhantomData,
        }
    }

    /// Accept what either schema accepts.
    pub fn or(self, other: Schema<T>) -> Self {
        let (a, b) = (self.predicate, other.predicate);
        Self {
            predicate: Arc::new(move |value| a(value) || b(value)),
            _marker: PhantomData,
        }
    }

    /// Return the typed value when the schema accepts it.
    pub fn narrow(&self, value: &Value) -> Option<T> {
        if !self.accepts(value) {
            return None;
        }
        T::deserialize(value).ok()
    }
}

impl<T> Schema<T> {
    /// Classify a value.
    pub fn accepts(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

/// Accept `{ "statusCode": code, "body": B }`.
pub fn status<B: DeserializeOwned + 'static>(code: u16) -> Schema<HttpResult<B>> {
    Schema::new(move |value| {
        value
            .get("statusCode")
            .and_then(Value::as_u64)
            .is_some_and(|s| s == u64::from(code))
    })
}

/// Accept the reserved generic 500 shape.
pub fn generic_internal_server_error() -> Schema<GenericInternalServerError> {
    status::<ErrorMessage>(INTERNAL_SERVER_ERROR)
}

/// Accept any `{statusCode, body}` value.
pub fn any_http_result() -> Schema<HttpResult> {
    Schema::new(|value| HttpResult::from_value(value).is_some())
}

/// Accept only the JSON `null` body, used by routes that take no payload.
pub fn empty_body() -> Schema<()> {
    Schema::new(Value::is_null)
}

/// Accept JSON objects that deserialize into `T`.
pub fn object<T: DeserializeOwned + 'static>() -> Schema<T> {
    Schema::new(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
    }

    #[test]
    fn test_typed_schema_is_deserialization_witness() {
        let s: Schema<User> = Schema::typed();
        assert!(s.accepts(&json!({"name": "ada"})));
        assert!(!s.accepts(&json!({"name": 1})));
        assert!(!s.accepts(&json!(null)));
        assert_eq!(s.narrow(&json!({"name": "ada"})), Some(User { name: "ada".into() }));
    }

    #[test]
    fn test_predicate_and_type_must_both_hold() {
        let s: Schema<User> = Schema::new(|v| v["name"] != "root");
        assert!(s.accepts(&json!({"name": "ada"})));
        assert!(!s.accepts(&json!({"name": "root"})));
        assert!(!s.accepts(&json!({"nom": "ada"})));
    }

    #[test]
    fn test_status_schema() {
        let s: Schema<HttpResult<User>> = status(200);
        assert!(s.accepts(&json!({"statusCode": 200, "body": {"name": "ada"}})));
        assert!(!s.accepts(&json!({"statusCode": 201, "body": {"name": "ada"}})));
        assert!(!s.accepts(&json!({"statusCode": 200, "body": {"error": "x"}})));
        assert!(!s.accepts(&json!({"status": 200, "body": {"name": "ada"}})));
    }

    #[test]
    fn test_or_and_refine() {
        let found: Schema<HttpResult> = status(200);
        let missing: Schema<HttpResult> = status(404);
        let s = found.or(missing);
        assert!(s.accepts(&json!({"statusCode": 200, "body": 1})));
        assert!(s.accepts(&json!({"statusCode": 404, "body": 1})));
        assert!(!s.accepts(&json!({"statusCode": 500, "body": 1})));

        let s = s.refine(|v| v["body"].is_number());
        assert!(s.accepts(&json!({"statusCode": 404, "body": 1})));
        assert!(!s.accepts(&json!({"statusCode": 404, "body": "1"})));
    }

    #[test]
    fn test_generic_internal_server_error_schema() {
        let s = generic_internal_server_error();
        assert!(s.accepts(&json!({"statusCode": 500, "body": {"errorMessage": "boom"}})));
        assert!(!s.accepts(&json!({"statusCode": 500, "body": {"errorMessage": 3}})));
        assert!(!s.accepts(&json!({"statusCode": 400, "body": {"errorMessage": "boom"}})));
    }

    #[test]
    fn test_empty_body_schema() {
        let s = empty_body();
        assert!(s.accepts(&Value::Null));
        assert!(!s.accepts(&json!({})));
    }

    #[test]
    fn test_schema_is_total_on_odd_input() {
        let s: Schema<HttpResult<User>> = status(200);
        for v in [json!(null), json!([]), json!("x"), json!(1.5), json!({"statusCode": -1})] {
            assert!(!s.accepts(&v));
        }
    }
}
