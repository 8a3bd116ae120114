//! Transport capabilities consumed by the dispatcher and the binder.
//!
//! The core never opens sockets itself. It talks to two narrow interfaces:
//!
//! - [`OutboundTransport`]: issue one HTTP request and hand back the status
//!   and decoded body, whatever the status code.
//! - [`InboundTransport`]: register a listener for a method and path
//!   template; the listener resolves to the `{statusCode, body}` to write.
//!
//! Built-in implementations: [`ReqwestTransport`] and [`AxumTransport`].

pub mod axum_server;
pub mod config;
pub mod http_client;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TransportError;
use crate::response::HttpResult;
use crate::route::HttpMethod;

pub use axum_server::AxumTransport;
pub use config::{ClientConfig, ServerConfig};
pub use http_client::ReqwestTransport;

/// Status and decoded body of an outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// Client-side capability: perform one HTTP call.
///
/// Implementations must not fail for non-2xx statuses, and must decode JSON
/// bodies (an empty body decodes to `null`).
#[async_trait]
pub trait OutboundTransport: Send + Sync {
    async fn issue_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: OutboundTransport + ?Sized> OutboundTransport for Arc<T> {
    async fn issue_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        (**self).issue_request(method, url, body).await
    }
}

/// A request as seen by an inbound listener.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
    /// Path parameters as a JSON object of strings.
    pub params: Value,
    /// Decoded JSON body; `Some(Value::Null)` when the request had no body,
    /// `None` when the body was present but not valid JSON.
    pub body: Option<Value>,
}

/// Listener invoked for every matching request.
pub type OnRequest = Arc<dyn Fn(InboundRequest) -> BoxFuture<'static, HttpResult> + Send + Sync>;

/// Server-side capability: register listeners on a routing surface.
pub trait InboundTransport {
    fn register(&mut self, method: HttpMethod, path_template: &str, on_request: OnRequest);
}
