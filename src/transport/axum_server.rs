//! axum-backed inbound transport.

use axum::{
    extract::{rejection::BytesRejection, RawPathParams},
    http::StatusCode,
    response::IntoResponse,
    routing::{on, MethodFilter},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{Map, Value};
use tower_http::trace::TraceLayer;

use super::{InboundRequest, InboundTransport, OnRequest};
use crate::response::{internal_server_error, HttpResult};
use crate::route::HttpMethod;

/// Collects listeners into an `axum::Router`.
#[derive(Default)]
pub struct AxumTransport {
    router: Router,
}

impl AxumTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish registration and return the router, with request tracing.
    pub fn into_router(self) -> Router {
        self.router.layer(TraceLayer::new_for_http())
    }
}

impl InboundTransport for AxumTransport {
    fn register(&mut self, method: HttpMethod, path_template: &str, on_request: OnRequest) {
        let filter = match method {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
        };

        let handler = move |params: Option<RawPathParams>, body: Result<Bytes, BytesRejection>| {
            let on_request = on_request.clone();
            async move {
                let params = match params {
                    Some(raw) => collect_params(raw.iter()),
                    None => Value::Object(Map::new()),
                };
                let body = match body {
                    Ok(bytes) => decode_body(&bytes),
                    Err(rejection) => {
                        log::warn!("request body rejected: {}", rejection);
                        None
                    }
                };
                write_response(on_request(InboundRequest { params, body }).await)
            }
        };

        let router = std::mem::take(&mut self.router);
        self.router = router.route(path_template, on(filter, handler));
    }
}

/// Path captures as a JSON object of strings.
///
/// A key captured more than once with different values yields `null`, which
/// no template with keys validates.
fn collect_params<'a>(captures: impl Iterator<Item = (&'a str, &'a str)>) -> Value {
    let mut params = Map::new();
    for (key, value) in captures {
        match params.get(key) {
            Some(previous) if previous.as_str() != Some(value) => {
                log::warn!("path parameter {} captured with conflicting values", key);
                return Value::Null;
            }
            _ => {
                params.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }
    Value::Object(params)
}

fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Some(Value::Null);
    }
    serde_json::from_slice(bytes).ok()
}

fn write_response(result: HttpResult) -> impl IntoResponse {
    match StatusCode::from_u16(result.status_code) {
        Ok(status) => (status, Json(result.body)),
        Err(_) => {
            log::warn!("invalid status code {}, writing 500", result.status_code);
            let fallback = internal_server_error(format!(
                "Handler returned invalid status code {}",
                result.status_code
            ));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::to_value(fallback.body).unwrap_or(Value::Null)),
            )
        }
    }
}
