//! Typed FEMSQ endpoints.
//!
//! Each area lives in its own file as an `impl FemsqApi` block. Errors from
//! the transport propagate unchanged.

mod audits;
mod chains;
mod connection;
mod files;
mod lookups;
mod organizations;
mod reports;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, Result};
use crate::http::HttpClient;
use crate::page::{ListResponse, Page};
use crate::transport::{ApiRequest, Body, Response, Transport};

/// Typed client for the FEMSQ REST API
#[derive(Clone)]
pub struct FemsqApi {
    transport: Arc<dyn Transport>,
}

impl FemsqApi {
    /// Wrap any transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build over a reqwest [`HttpClient`].
    pub fn from_config(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(HttpClient::new(config)?)))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.transport.send(request).await?;
        decode(response)
    }

    async fn send_list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Page<T>> {
        let response: ListResponse<T> = self.send_json(request).await?;
        Ok(Page::from(response))
    }

    async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        self.transport.send(request).await.map(|_| ())
    }

    async fn send_bytes(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let response = self.transport.send(request.binary()).await?;
        Ok(match response.body {
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => text.into_bytes(),
            Body::Json(value) => value.to_string().into_bytes(),
            Body::Empty => Vec::new(),
        })
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let Response { status, url, body } = response;
    let value = match body {
        Body::Json(value) => value,
        Body::Empty => Value::Null,
        Body::Text(text) => Value::String(text),
        Body::Bytes(_) => return Err(ApiError::decode(status, url, "expected JSON, got binary data")),
    };
    serde_json::from_value(value).map_err(|e| ApiError::decode(status, url, e))
}

fn json_body<T: Serialize>(path: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::decode(0, path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use crate::transport::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_decode_error_keeps_status_and_url() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::Get, "ra/audits/1", MockReply::Json(json!({"unexpected": true})));
        let api = FemsqApi::new(mock);

        let err = api.get_audit(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.status(), 200);
        assert!(err.url().ends_with("ra/audits/1"));
    }

    #[tokio::test]
    async fn test_send_bytes_accepts_text_body() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::Post, "v1/reports/r1/preview", MockReply::Text("%PDF".into()));
        let api = FemsqApi::new(mock.clone());

        let bytes = api.generate_preview("r1", &Default::default()).await.unwrap();
        assert_eq!(bytes, b"%PDF".to_vec());
        let call = mock.last_call(Method::Post, "v1/reports/r1/preview").unwrap();
        assert_eq!(call.response, crate::transport::ResponseKind::Binary);
    }
}
