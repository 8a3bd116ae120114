//! # route-contract
//!
//! Contract-first HTTP routes shared by client and server.
//!
//! A [`RouteContract`] describes one endpoint: a [`UrlTemplate`], an HTTP
//! method, a return [`Schema`], and for `post`/`put`/`delete` a body schema.
//! The same value drives both sides:
//!
//! - [`Dispatcher::send`] builds the URL, issues the call over an
//!   [`OutboundTransport`] and classifies the response into a [`Reply`]
//! - [`bind`] wraps a business handler so that every inbound request is
//!   validated and answered with exactly one `{statusCode, body}`
//!
//! Failures that are not a declared result travel as the reserved
//! [`GenericInternalServerError`]: status 500 with `{ "errorMessage": .. }`.
//!
//! Transports are pluggable. [`ReqwestTransport`] and [`AxumTransport`] are
//! provided.

pub mod binder;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod response;
pub mod route;
pub mod schema;
pub mod template;
pub mod transport;

pub use binder::{bind, Binding, RouteHandler, RouteTable};
pub use dispatcher::Dispatcher;
pub use error::{ContractError, HandlerError, Result, TransportError};
pub use response::{ErrorMessage, GenericInternalServerError, HttpResult, Reply};
pub use route::{HttpMethod, RouteContract, RouteKind};
pub use schema::Schema;
pub use template::UrlTemplate;
pub use transport::{
    AxumTransport, ClientConfig, InboundTransport, OutboundTransport, ReqwestTransport,
    ServerConfig,
};
