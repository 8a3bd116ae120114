//! reqwest-backed outbound transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::{ClientConfig, OutboundTransport, RawResponse};
use crate::error::TransportError;
use crate::route::HttpMethod;

/// Outbound transport over a shared `reqwest::Client`.
///
/// Non-2xx statuses are returned as data. Bodies that are not valid JSON are
/// returned as a JSON string; empty bodies as `null`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidConfig(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidConfig(format!("header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl OutboundTransport for ReqwestTransport {
    async fn issue_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        let full_url = format!("{}{}", self.base_url, url);
        log::debug!("{} {}", method, full_url);

        let mut request = self
            .client
            .request(method.into(), &full_url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        Ok(RawResponse {
            status,
            body: decode_body(text),
        })
    }
}

impl ReqwestTransport {
    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout_ms)
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(String::new()), Value::Null);
        assert_eq!(decode_body(r#"{"a":1}"#.into()), json!({"a": 1}));
        assert_eq!(decode_body("not json".into()), json!("not json"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let t = ReqwestTransport::new(&ClientConfig::new("http://localhost:1/")).unwrap();
        assert_eq!(t.base_url(), "http://localhost:1");
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = ClientConfig::new("http://localhost:1").with_header("bad header", "v");
        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(TransportError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::new(format!("http://127.0.0.1:{}", port)).with_timeout_ms(2_000);
        let t = ReqwestTransport::new(&config).unwrap();
        let err = t.issue_request(HttpMethod::Get, "/", None).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_) | TransportError::Timeout(_)));
    }
}
