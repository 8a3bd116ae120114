//! Error types for route contracts.
//!
//! Outbound failures are surfaced to the calling code as [`ContractError`].
//! Inbound failures never leave the binder: they are converted into a
//! structured HTTP response before reaching the transport.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while building, dispatching, or serving a route contract.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A URL template was declared with the wrong literal/key arity or an
    /// unparseable pattern. Fatal at startup.
    #[error("Invalid url template: {0}")]
    Construction(String),

    /// The parameters supplied to a URL build did not match the template.
    #[error("Url parameters given to route {template} are invalid.")]
    InvalidUrlParameters {
        /// The braced pattern of the route, e.g. `/users/{id}`.
        template: String,
    },

    /// The server answered with something the route's return schema rejects
    /// and that is not the reserved generic 500 shape.
    #[error("Received unexpected result from server")]
    UnexpectedServerResponse {
        /// Raw HTTP status code.
        status: u16,
        /// Raw decoded response body.
        body: Value,
    },

    /// Inbound path parameters failed template validation.
    #[error("Invalid route parameters")]
    InvalidRouteParameters,

    /// Inbound request body failed the route's body schema.
    #[error("Invalid request body")]
    InvalidRequestBody,

    /// The outbound transport could not complete the call at all.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A typed value could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Socket-level failures reported by an outbound transport.
///
/// HTTP status codes are never reported here; a 404 or a 500 is a normal
/// response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure returned by a route handler.
///
/// `Respond` is the way business logic hands back a typed error result on
/// purpose: the binder writes it through when the route's return schema
/// accepts it. Everything else becomes a generic 500 carrying the message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Handler rejected with result {0}")]
    Respond(Value),

    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

impl HandlerError {
    /// Reject with a typed result, e.g. an `HttpResult` with a 404 status.
    pub fn respond<T: serde::Serialize>(result: T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::Respond(value),
            Err(e) => Self::Failure(e.into()),
        }
    }

    /// Fail with a plain message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self::Failure(anyhow::anyhow!("{}", message))
    }
}

impl From<ContractError> for HandlerError {
    fn from(e: ContractError) -> Self {
        Self::Failure(e.into())
    }
}

pub type Result<T, E = ContractError> = std::result::Result<T, E>;
