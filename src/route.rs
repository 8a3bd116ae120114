//! Route contracts: one immutable descriptor per HTTP endpoint.
//!
//! A [`RouteContract`] binds a [`UrlTemplate`] to an HTTP method, a return
//! schema, and (for `post`/`put`/`delete`) a request-body schema. The same
//! value is handed to the client-side [`Dispatcher`](crate::dispatcher::Dispatcher)
//! and to the server-side [`bind`](crate::binder::bind), so both sides agree
//! on paths, parameters, and response shapes.
//!
//! The body schema lives inside [`RouteKind`], so a `get` route cannot carry
//! one and the other methods always do.
//!
//! # Example
//!
//! ```
//! use route_contract::response::HttpResult;
//! use route_contract::route::{HttpMethod, RouteContract};
//! use route_contract::schema::{self, Schema};
//! use route_contract::template::UrlTemplate;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct UserParams {
//!     id: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let get_user: RouteContract<UserParams, HttpResult<User>> = RouteContract::get(
//!     UrlTemplate::parse("/users/{id}").unwrap(),
//!     schema::status(200),
//! );
//! assert_eq!(get_user.method(), HttpMethod::Get);
//! assert!(get_user.body_schema().is_none());
//! assert_eq!(get_user.build_url(&UserParams { id: "7".into() }).unwrap(), "/users/7");
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::schema::Schema;
use crate::template::UrlTemplate;

/// HTTP methods a route contract can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Method tag of a route. Every variant except `Get` carries the body schema.
pub enum RouteKind<B> {
    Get,
    Post(Schema<B>),
    Put(Schema<B>),
    Delete(Schema<B>),
}

impl<B> RouteKind<B> {
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::Get => HttpMethod::Get,
            Self::Post(_) => HttpMethod::Post,
            Self::Put(_) => HttpMethod::Put,
            Self::Delete(_) => HttpMethod::Delete,
        }
    }

    pub fn body_schema(&self) -> Option<&Schema<B>> {
        match self {
            Self::Get => None,
            Self::Post(s) | Self::Put(s) | Self::Delete(s) => Some(s),
        }
    }
}

impl<B> Clone for RouteKind<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Get => Self::Get,
            Self::Post(s) => Self::Post(s.clone()),
            Self::Put(s) => Self::Put(s.clone()),
            Self::Delete(s) => Self::Delete(s.clone()),
        }
    }
}

/// Immutable, transport-agnostic description of one endpoint.
///
/// * `P`: path parameter type (serializes to a string map)
/// * `R`: declared result type (serializes to `{statusCode, body}`)
/// * `B`: request body type, `()` for `get` routes
pub struct RouteContract<P, R, B = ()> {
    template: UrlTemplate,
    return_schema: Schema<R>,
    kind: RouteKind<B>,
    _params: PhantomData<fn() -> P>,
}

impl<P, R> RouteContract<P, R, ()> {
    pub fn get(template: UrlTemplate, return_schema: Schema<R>) -> Self {
        Self::with_kind(template, return_schema, RouteKind::Get)
    }
}

impl<P, R, B> RouteContract<P, R, B> {
    pub fn post(template: UrlTemplate, return_schema: Schema<R>, body_schema: Schema<B>) -> Self {
        Self::with_kind(template, return_schema, RouteKind::Post(body_schema))
    }

    pub fn put(template: UrlTemplate, return_schema: Schema<R>, body_schema: Schema<B>) -> Self {
        Self::with_kind(template, return_schema, RouteKind::Put(body_schema))
    }

    pub fn delete(template: UrlTemplate, return_schema: Schema<R>, body_schema: Schema<B>) -> Self {
        Self::with_kind(template, return_schema, RouteKind::Delete(body_schema))
    }

    fn with_kind(template: UrlTemplate, return_schema: Schema<R>, kind: RouteKind<B>) -> Self {
        Self {
            template,
            return_schema,
            kind,
            _params: PhantomData,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.kind.method()
    }

    pub fn kind(&self) -> &RouteKind<B> {
        &self.kind
    }

    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    pub fn return_schema(&self) -> &Schema<R> {
        &self.return_schema
    }

    /// `None` exactly when the route is a `get`.
    pub fn body_schema(&self) -> Option<&Schema<B>> {
        self.kind.body_schema()
    }

    /// Check raw path parameters against the URL template.
    pub fn validate_params(&self, params: &Value) -> bool {
        self.template.validate(params)
    }

    /// Build the request path for typed parameters.
    pub fn build_url(&self, params: &P) -> Result<String>
    where
        P: Serialize,
    {
        self.template.build_from(params)
    }
}

impl<P, R, B> Clone for RouteContract<P, R, B> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            return_schema: self.return_schema.clone(),
            kind: self.kind.clone(),
            _params: PhantomData,
        }
    }
}

impl<P, R, B> fmt::Debug for RouteContract<P, R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteContract")
            .field("method", &self.method())
            .field("template", &self.template.pattern())
            .field("return_schema", &self.return_schema)
            .field("has_body_schema", &self.body_schema().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::HttpResult;
    use crate::schema::{self, Schema};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Serialize, Deserialize)]
    struct NewPost {
        title: String,
    }

    fn template() -> UrlTemplate {
        UrlTemplate::parse("/users/{id}/posts").unwrap()
    }

    #[test]
    fn test_get_has_no_body_schema() {
        let route: RouteContract<HashMap<String, String>, HttpResult> =
            RouteContract::get(template(), schema::status(200));
        assert_eq!(route.method(), HttpMethod::Get);
        assert!(route.body_schema().is_none());
        assert!(matches!(route.kind(), RouteKind::Get));
    }

    #[test]
    fn test_mutating_methods_carry_body_schema() {
        let body: Schema<NewPost> = Schema::typed();
        let post: RouteContract<HashMap<String, String>, HttpResult, NewPost> =
            RouteContract::post(template(), schema::status(201), body.clone());
        let put: RouteContract<HashMap<String, String>, HttpResult, NewPost> =
            RouteContract::put(template(), schema::status(200), body.clone());
        let delete: RouteContract<HashMap<String, String>, HttpResult, NewPost> =
            RouteContract::delete(template(), schema::status(204), body);

        for (route, method) in [
            (&post, HttpMethod::Post),
            (&put, HttpMethod::Put),
            (&delete, HttpMethod::Delete),
        ] {
            assert_eq!(route.method(), method);
            let schema = route.body_schema().expect("body schema present");
            assert!(schema.accepts(&json!({"title": "hello"})));
            assert!(!schema.accepts(&json!({"title": 5})));
        }
    }

    #[test]
    fn test_build_url_and_validate_params() {
        let route: RouteContract<HashMap<String, String>, HttpResult> =
            RouteContract::get(template(), schema::status(200));
        let params = HashMap::from([("id".to_string(), "7".to_string())]);
        assert_eq!(route.build_url(&params).unwrap(), "/users/7/posts");
        assert!(route.validate_params(&json!({"id": "7"})));
        assert!(!route.validate_params(&json!({"id": 7})));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }

    #[test]
    fn test_contract_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RouteContract<HashMap<String, String>, HttpResult, NewPost>>();
    }
}
