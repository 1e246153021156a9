//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, Body, Method, Query, Response, ResponseKind, Transport};

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// HTTP transport for the FEMSQ API
///
/// Makes exactly one attempt per request. The timer covers the whole
/// exchange, body included; when it fires the in-flight future is dropped.
pub struct HttpClient {
    base: Url,
    origin: Url,
    default_timeout: Duration,
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let base = config.resolved_base_url()?;
        let mut origin = base.clone();
        origin.set_path("/");
        origin.set_query(None);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        debug!(base_url = %base, timeout_ms = config.default_timeout.as_millis() as u64, "FEMSQ HTTP client ready");

        Ok(Self {
            base,
            origin,
            default_timeout: config.default_timeout,
            client,
        })
    }

    /// Base URL every relative path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a request path and query into an absolute URL.
    ///
    /// `api/...` paths are joined onto the origin so the base segment is not
    /// repeated.
    pub fn resolve_url(&self, path: &str, query: &Query) -> Result<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            let relative = path.trim_start_matches('/');
            if relative.starts_with("api/") {
                self.origin.join(relative)
            } else {
                self.base.join(relative)
            }
        }
        .map_err(|e| ApiError::network(path, format!("invalid request URL: {}", e)))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    async fn execute(&self, request: &ApiRequest, url: &Url) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.into(), url.clone())
            .header(header::ACCEPT, accept_header(request.response));
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "FEMSQ request failed before a response");
            ApiError::network(url.as_str(), e.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = match Body::from_text(text, is_json) {
                Body::Empty => None,
                body => Some(body),
            };
            let status_text = status.canonical_reason().unwrap_or("").to_string();
            let error = match request.response {
                ResponseKind::Binary => {
                    ApiError::http_lenient(status.as_u16(), status_text, url.as_str(), body)
                }
                ResponseKind::Json => ApiError::http(status.as_u16(), status_text, url.as_str(), body),
            };
            warn!(url = %url, status = status.as_u16(), message = %error, "FEMSQ request returned an error status");
            return Err(error);
        }

        let body = match request.response {
            ResponseKind::Binary => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ApiError::network(url.as_str(), e.to_string()))?;
                Body::Bytes(bytes.to_vec())
            }
            ResponseKind::Json => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ApiError::network(url.as_str(), e.to_string()))?;
                if is_json && !text.trim().is_empty() {
                    let value = serde_json::from_str(&text)
                        .map_err(|e| ApiError::decode(status.as_u16(), url.as_str(), e))?;
                    Body::Json(value)
                } else {
                    Body::from_text(text, false)
                }
            }
        };

        Ok(Response {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }
}

fn accept_header(kind: ResponseKind) -> &'static str {
    match kind {
        ResponseKind::Json => "application/json",
        ResponseKind::Binary => "*/*",
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<Response> {
        let url = self.resolve_url(&request.path, &request.query)?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        debug!(method = %request.method, url = %url, "FEMSQ request");

        match tokio::time::timeout(timeout, self.execute(&request, &url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(url = %url, timeout_ms = timeout.as_millis() as u64, "FEMSQ request timed out");
                Err(ApiError::timeout(url.as_str(), timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpClient {
        HttpClient::new(ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let client = client("http://localhost:8080/api");
        let url = client.resolve_url("/v1/organizations", &Query::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/organizations");
    }

    #[test]
    fn test_resolve_api_prefixed_path_does_not_duplicate_base() {
        let client = client("/api");
        let url = client.resolve_url("api/ra/audits", &Query::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/ra/audits");
    }

    #[test]
    fn test_resolve_absolute_path_is_kept() {
        let client = client("/api");
        let url = client
            .resolve_url("https://reports.example.com/x", &Query::new())
            .unwrap();
        assert_eq!(url.as_str(), "https://reports.example.com/x");
    }

    #[test]
    fn test_resolve_appends_non_empty_query() {
        let client = client("/api");
        let query = Query::new().with("page", 0).with("ogName", "").with("sort", "ogNm,asc");
        let url = client.resolve_url("v1/organizations", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v1/organizations?page=0&sort=ogNm%2Casc"
        );
    }
}
