//! In-memory transport for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::{ApiError, Result};
use crate::transport::{ApiRequest, Body, Method, Response, Transport};

const MOCK_ORIGIN: &str = "http://mock.femsq/api/";

/// Canned reply for a mocked route
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
    /// Non-2xx status with a JSON body
    Status { status: u16, body: Value },
    /// Failure before any response
    Network,
    /// Timer fired
    Timeout,
}

#[derive(Default)]
struct Route {
    replies: VecDeque<(MockReply, Option<Duration>)>,
}

impl Route {
    /// Next reply; the last one repeats forever.
    fn next(&mut self) -> Option<(MockReply, Option<Duration>)> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

/// Mock transport for testing.
///
/// Routes are keyed by method and path. Replies queued on one route are
/// served in order, the last reply repeating. Unrouted requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`.
    pub fn on(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.push(method, path, reply, None)
    }

    /// Queue a reply that is delivered after `delay`.
    pub fn on_delayed(&self, method: Method, path: &str, reply: MockReply, delay: Duration) -> &Self {
        self.push(method, path, reply, Some(delay))
    }

    fn push(&self, method: Method, path: &str, reply: MockReply, delay: Option<Duration>) -> &Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes
                .entry((method, normalize(path)))
                .or_default()
                .replies
                .push_back((reply, delay));
        }
        self
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of requests seen for `method path`, including in-flight ones.
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        let path = normalize(path);
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|c| c.method == method && normalize(&c.path) == path)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Most recent request for `method path`.
    pub fn last_call(&self, method: Method, path: &str) -> Option<ApiRequest> {
        let path = normalize(path);
        self.calls.lock().ok().and_then(|calls| {
            calls
                .iter()
                .rev()
                .find(|c| c.method == method && normalize(&c.path) == path)
                .cloned()
        })
    }

    /// Forget recorded calls. Routes are kept.
    pub fn reset_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Response> {
        let path = normalize(&request.path);
        let url = format!("{}{}", MOCK_ORIGIN, path);

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let next = self
            .routes
            .lock()
            .ok()
            .and_then(|mut routes| routes.get_mut(&(request.method, path)).and_then(Route::next));

        let Some((reply, delay)) = next else {
            return Err(ApiError::http(
                404,
                "Not Found",
                url,
                Some(Body::Json(serde_json::json!({ "message": "No mock route" }))),
            ));
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let body = match reply {
            MockReply::Json(value) => Body::Json(value),
            MockReply::Text(text) => Body::Text(text),
            MockReply::Bytes(bytes) => Body::Bytes(bytes),
            MockReply::Empty => Body::Empty,
            MockReply::Status { status, body } => {
                return Err(ApiError::http(status, "", url, Some(Body::Json(body))));
            }
            MockReply::Network => return Err(ApiError::network(url, "mock network failure")),
            MockReply::Timeout => {
                return Err(ApiError::timeout(url, request.timeout.unwrap_or(DEFAULT_TIMEOUT)));
            }
        };

        Ok(Response {
            status: 200,
            url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "og", MockReply::Json(json!([1])))
            .on(Method::Get, "/og", MockReply::Json(json!([2])));

        let first = mock.send(ApiRequest::get("og")).await.unwrap();
        let second = mock.send(ApiRequest::get("og")).await.unwrap();
        let third = mock.send(ApiRequest::get("og")).await.unwrap();

        assert_eq!(first.body, Body::Json(json!([1])));
        assert_eq!(second.body, Body::Json(json!([2])));
        assert_eq!(third.body, Body::Json(json!([2])));
        assert_eq!(mock.call_count(Method::Get, "og"), 3);
    }

    #[tokio::test]
    async fn test_unrouted_request_is_404() {
        let mock = MockTransport::new();
        let err = mock.send(ApiRequest::get("ra/files")).await.unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.message(), "No mock route");
    }

    #[tokio::test]
    async fn test_status_reply_uses_json_message() {
        let mock = MockTransport::new();
        mock.on(
            Method::Delete,
            "ra/audits/7",
            MockReply::Status {
                status: 409,
                body: json!({"message": "Audit has files"}),
            },
        );

        let err = mock.send(ApiRequest::delete("ra/audits/7")).await.unwrap_err();
        assert_eq!(err.status(), 409);
        assert_eq!(err.to_string(), "Audit has files");
        assert!(mock.last_call(Method::Delete, "ra/audits/7").is_some());
    }
}
