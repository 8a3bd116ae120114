//! Inbound binder: the serving side of a route contract.
//!
//! [`bind`] turns a contract and a business handler into a [`Binding`]: plain
//! data describing what to register. A [`RouteTable`] collects bindings and
//! hands all of them to an [`InboundTransport`] in one pass, so there is no
//! global router being mutated as a side effect.
//!
//! Per request the binder:
//!
//! 1. validates path parameters against the URL template
//! 2. validates the body when the route has a body schema
//! 3. runs the handler
//! 4. writes a successful result as-is (no return-schema check)
//! 5. on any failure, writes the failure value through if the return schema
//!    accepts it, else the generic 500 `{ "errorMessage": .. }`
//!
//! Every request gets exactly one structured response. Handler panics are
//! caught at the same boundary.
//!
//! # Example
//!
//! ```
//! use route_contract::binder::{bind, RouteTable};
//! use route_contract::response::HttpResult;
//! use route_contract::route::RouteContract;
//! use route_contract::schema;
//! use route_contract::template::UrlTemplate;
//! use std::collections::HashMap;
//!
//! let health: RouteContract<HashMap<String, String>, HttpResult> =
//!     RouteContract::get(UrlTemplate::parse("/health").unwrap(), schema::status(200));
//!
//! let router = RouteTable::new()
//!     .route(bind(health, |_: HashMap<String, String>, _: Option<()>| async {
//!         Ok::<_, route_contract::HandlerError>(HttpResult::new(
//!             200,
//!             serde_json::json!({"status": "ok"}),
//!         ))
//!     }))
//!     .into_router()
//!     .unwrap();
//! # let _ = router;
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ContractError, HandlerError, Result};
use crate::response::{internal_server_error, HttpResult};
use crate::route::{HttpMethod, RouteContract, RouteKind};
use crate::schema::Schema;
use crate::transport::{AxumTransport, InboundRequest, InboundTransport, OnRequest};

/// Business logic behind one route.
///
/// Implemented for any `Fn(P, Option<B>) -> impl Future<Output = Result<R, HandlerError>>`.
/// `body` is `None` for `get` routes and always `Some` otherwise.
pub trait RouteHandler<P, B, R>: Send + Sync + 'static {
    fn call(&self, params: P, body: Option<B>) -> BoxFuture<'static, Result<R, HandlerError>>;
}

impl<F, Fut, P, B, R> RouteHandler<P, B, R> for F
where
    F: Fn(P, Option<B>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
{
    fn call(&self, params: P, body: Option<B>) -> BoxFuture<'static, Result<R, HandlerError>> {
        self(params, body).boxed()
    }
}

/// A contract bound to its handler, ready to be registered.
#[derive(Clone)]
pub struct Binding {
    method: HttpMethod,
    pattern: String,
    path_template: String,
    on_request: OnRequest,
}

impl Binding {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Braced pattern, e.g. `/users/{id}`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Transport path, e.g. `/users/:id`.
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// Run the full validate → handle → classify pipeline for one request.
    pub async fn handle(&self, request: InboundRequest) -> HttpResult {
        (self.on_request)(request).await
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Bind `handler` to `contract`.
///
/// Accepts either an owned contract or an `Arc` shared with a dispatcher.
pub fn bind<P, R, B, H>(contract: impl Into<Arc<RouteContract<P, R, B>>>, handler: H) -> Binding
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + DeserializeOwned + Send + 'static,
    B: DeserializeOwned + Send + 'static,
    H: RouteHandler<P, B, R>,
{
    let contract: Arc<RouteContract<P, R, B>> = contract.into();
    let handler = Arc::new(handler);

    let method = contract.method();
    let pattern = contract.template().pattern();
    let path_template = contract.template().path_template();
    log::debug!("binding {} {}", method, pattern);

    let on_request: OnRequest = Arc::new(move |request: InboundRequest| {
        let contract = contract.clone();
        let handler = handler.clone();
        async move { serve(&contract, handler.as_ref(), request).await }.boxed()
    });

    Binding {
        method,
        pattern,
        path_template,
        on_request,
    }
}

async fn serve<P, R, B, H>(
    contract: &RouteContract<P, R, B>,
    handler: &H,
    request: InboundRequest,
) -> HttpResult
where
    P: DeserializeOwned,
    R: Serialize + DeserializeOwned + 'static,
    B: DeserializeOwned + 'static,
    H: RouteHandler<P, B, R>,
{
    let outcome = match decode(contract, request) {
        Ok((params, body)) => AssertUnwindSafe(handler.call(params, body))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(HandlerError::msg("Handler panicked"))),
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(result) => write_result(&result),
        Err(e) => recover(contract.return_schema(), e),
    }
}

/// Steps 1 and 2: parameter and body validation.
fn decode<P, R, B>(
    contract: &RouteContract<P, R, B>,
    request: InboundRequest,
) -> Result<(P, Option<B>)>
where
    P: DeserializeOwned,
    B: DeserializeOwned + 'static,
{
    if !contract.validate_params(&request.params) {
        return Err(ContractError::InvalidRouteParameters);
    }
    let params =
        P::deserialize(&request.params).map_err(|_| ContractError::InvalidRouteParameters)?;

    let body = match contract.kind() {
        RouteKind::Get => None,
        RouteKind::Post(schema) | RouteKind::Put(schema) | RouteKind::Delete(schema) => {
            Some(check_body(schema, request.body)?)
        }
    };

    Ok((params, body))
}

fn check_body<B>(schema: &Schema<B>, body: Option<Value>) -> Result<B>
where
    B: DeserializeOwned + 'static,
{
    body.and_then(|value| schema.narrow(&value))
        .ok_or(ContractError::InvalidRequestBody)
}

/// Step 4: the handler's result goes out without a return-schema check.
fn write_result<R: Serialize>(result: &R) -> HttpResult {
    let written = serde_json::to_value(result)
        .ok()
        .and_then(|value| HttpResult::from_value(&value));
    match written {
        Some(response) => response,
        None => {
            log::warn!("handler result does not serialize to {{statusCode, body}}");
            generic(internal_server_error("Handler result is not an HTTP result"))
        }
    }
}

/// Step 5: classify a failure against the route's return schema.
fn recover<R>(return_schema: &Schema<R>, error: HandlerError) -> HttpResult
where
    R: DeserializeOwned + 'static,
{
    if let HandlerError::Respond(value) = &error {
        if return_schema.accepts(value) {
            if let Some(response) = HttpResult::from_value(value) {
                return response;
            }
        }
    }
    log::debug!("request failed: {}", error);
    generic(internal_server_error(error.to_string()))
}

fn generic<B: Serialize>(response: HttpResult<B>) -> HttpResult {
    HttpResult::new(
        response.status_code,
        serde_json::to_value(response.body).unwrap_or(Value::Null),
    )
}

/// An ordered set of bindings, registered together.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    bindings: Vec<Binding>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding (builder style).
    pub fn route(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Register every binding on `transport`.
    ///
    /// Fails without registering anything when two bindings share a method
    /// and path, or when a path does not start with `/`.
    pub fn mount<T: InboundTransport>(self, transport: &mut T) -> Result<()> {
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if !binding.path_template.starts_with('/') {
                return Err(ContractError::Construction(format!(
                    "route path must start with '/': {}",
                    binding.pattern
                )));
            }
            if !seen.insert((binding.method, binding.path_template.as_str())) {
                return Err(ContractError::Construction(format!(
                    "duplicate route {} {}",
                    binding.method, binding.pattern
                )));
            }
        }

        for binding in self.bindings {
            log::debug!("registering {} {}", binding.method, binding.path_template);
            transport.register(binding.method, &binding.path_template, binding.on_request);
        }
        Ok(())
    }

    /// Mount on a fresh [`AxumTransport`] and return the router.
    pub fn into_router(self) -> Result<axum::Router> {
        let mut transport = AxumTransport::new();
        self.mount(&mut transport)?;
        Ok(transport.into_router())
    }
}
