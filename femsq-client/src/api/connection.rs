use std::time::Duration;

use super::{json_body, FemsqApi};
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{ConnectionConfigResponse, ConnectionStatusResponse, ConnectionTestRequest};

/// The first status call after start-up waits for the backend to connect.
pub const CONNECTION_STATUS_TIMEOUT: Duration = Duration::from_secs(30);

impl FemsqApi {
    pub async fn connection_status(&self) -> Result<ConnectionStatusResponse> {
        self.send_json(
            ApiRequest::get("v1/connection/status").with_timeout(CONNECTION_STATUS_TIMEOUT),
        )
        .await
    }

    /// Try a configuration without saving it.
    pub async fn test_connection(&self, request: &ConnectionTestRequest) -> Result<ConnectionStatusResponse> {
        let path = "v1/connection/test";
        self.send_json(ApiRequest::post(path, json_body(path, request)?))
            .await
    }

    /// Save a configuration and reconnect.
    pub async fn apply_connection(&self, request: &ConnectionTestRequest) -> Result<ConnectionStatusResponse> {
        let path = "v1/connection/apply";
        self.send_json(ApiRequest::post(path, json_body(path, request)?))
            .await
    }

    pub async fn connection_config(&self) -> Result<ConnectionConfigResponse> {
        self.send_json(ApiRequest::get("v1/connection/config")).await
    }
}
