//! Outbound dispatcher: the calling side of a route contract.
//!
//! [`Dispatcher::send`] builds the URL from the contract's template, issues
//! exactly one transport call, and classifies the response:
//!
//! 1. status 500 with a string `errorMessage` → [`Reply::InternalError`]
//! 2. `{statusCode, body}` accepted by the return schema → [`Reply::Declared`]
//! 3. anything else → [`ContractError::UnexpectedServerResponse`]
//!
//! Non-2xx statuses are ordinary data at every step. Nothing is retried.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ContractError, Result};
use crate::response::{as_generic_internal_server_error, HttpResult, Reply};
use crate::route::{RouteContract, RouteKind};
use crate::schema::Schema;
use crate::transport::{OutboundTransport, RawResponse};

/// Client for route contracts over an [`OutboundTransport`].
///
/// Cheap to clone; clones share the transport.
pub struct Dispatcher<T: ?Sized> {
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T: OutboundTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }
}

impl<T: OutboundTransport + ?Sized> Dispatcher<T> {
    pub fn from_arc(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Call the endpoint described by `contract`.
    ///
    /// `body` is sent for `post`/`put`/`delete` routes and ignored for `get`.
    /// Fails with [`ContractError::InvalidUrlParameters`] before any I/O when
    /// `params` do not fit the template.
    pub async fn send<P, R, B>(
        &self,
        contract: &RouteContract<P, R, B>,
        params: &P,
        body: Option<&B>,
    ) -> Result<Reply<R>>
    where
        P: Serialize,
        R: DeserializeOwned + 'static,
        B: Serialize,
    {
        let url = contract.build_url(params)?;

        let payload = match contract.kind() {
            RouteKind::Get => None,
            RouteKind::Post(_) | RouteKind::Put(_) | RouteKind::Delete(_) => {
                body.map(serde_json::to_value).transpose()?
            }
        };

        log::debug!("dispatching {} {}", contract.method(), url);
        let raw = self
            .transport
            .issue_request(contract.method(), &url, payload.as_ref())
            .await?;

        classify(contract.return_schema(), raw)
    }
}

/// Turn a raw response into a [`Reply`] using the route's return schema.
pub fn classify<R>(return_schema: &Schema<R>, raw: RawResponse) -> Result<Reply<R>>
where
    R: DeserializeOwned + 'static,
{
    if let Some(generic) = as_generic_internal_server_error(raw.status, &raw.body) {
        return Ok(Reply::InternalError(generic));
    }

    let candidate = HttpResult::new(raw.status, raw.body).to_value();
    if let Some(result) = return_schema.narrow(&candidate) {
        return Ok(Reply::Declared(result));
    }

    log::warn!(
        "response with status {} does not match the route's return schema",
        raw.status
    );
    Err(ContractError::UnexpectedServerResponse {
        status: raw.status,
        body: candidate["body"].clone(),
    })
}
