//! Transport abstraction between typed endpoints and the wire.
//!
//! `FemsqApi` speaks in [`ApiRequest`]s and [`Response`]s; a [`Transport`]
//! turns them into real HTTP traffic (`HttpClient`) or canned replies
//! (`MockTransport`).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// HTTP method used by the FEMSQ API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// How the success body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// JSON when the content type says so, text otherwise
    #[default]
    Json,
    /// Raw bytes (report documents)
    Binary,
}

/// Query string parameters.
///
/// Empty values are never stored, so they never reach the URL. Setting a key
/// twice replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set a parameter only when a value is present.
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.set(key, value);
        }
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        self.params.retain(|(k, _)| *k != key);
        if !value.is_empty() {
            self.params.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<&BTreeMap<String, String>> for Query {
    fn from(map: &BTreeMap<String, String>) -> Self {
        map.iter()
            .fold(Query::new(), |query, (key, value)| query.with(key.clone(), value))
    }
}

/// A single request to the FEMSQ API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base (e.g. `v1/organizations`) or an absolute URL
    pub path: String,
    pub query: Query,
    /// JSON body for POST/PUT
    pub body: Option<Value>,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
    pub response: ResponseKind,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            timeout: None,
            response: ResponseKind::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the success body as raw bytes.
    pub fn binary(mut self) -> Self {
        self.response = ResponseKind::Binary;
        self
    }
}

/// Response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
}

impl Body {
    /// Parse a body the way the server labelled it.
    pub fn from_text(text: String, is_json: bool) -> Self {
        if text.trim().is_empty() {
            return Body::Empty;
        }
        if is_json {
            if let Ok(value) = serde_json::from_str(&text) {
                return Body::Json(value);
            }
        }
        Body::Text(text)
    }

    /// `message` field of a JSON object body.
    pub fn json_message(&self) -> Option<String> {
        match self {
            Body::Json(Value::Object(map)) => map.get("message").map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        }
    }

    /// `message`, then `error`, then the raw text.
    pub fn lenient_message(&self) -> Option<String> {
        match self {
            Body::Json(Value::Object(map)) => ["message", "error"]
                .iter()
                .filter_map(|field| map.get(*field).and_then(Value::as_str))
                .find(|s| !s.is_empty())
                .map(str::to_string),
            Body::Text(text) => match serde_json::from_str::<Value>(text) {
                Ok(value @ Value::Object(_)) => Body::Json(value).lenient_message(),
                _ if !text.is_empty() => Some(text.clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Successful response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    /// Resolved URL the response came from
    pub url: String,
    pub body: Body,
}

/// Wire transport for FEMSQ API requests.
///
/// Implementations return `Ok` only for 2xx responses and classify every
/// failure into an [`ApiError`](crate::ApiError) variant. They never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request.
    async fn send(&self, request: ApiRequest) -> Result<Response>;
}
