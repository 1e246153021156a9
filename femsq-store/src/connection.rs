//! Database connection status and navigation gate.
//!
//! ```text
//!          apply()               connected
//!   Idle ───────────▶ Connecting ──────────▶ Connected
//!    ▲                    │                      │
//!    │                    │ failed               │ disconnect()
//!    │                    ▼                      ▼
//!    └──────────── ConnectionError       Disconnecting ──▶ Idle
//! ```
//!
//! Entering `Idle` or `ConnectionError` returns the user to the home view.

use femsq_client::{AuthMode, ConnectionStatusResponse, ConnectionTestRequest, FemsqApi};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};

pub const AWAITING_CONNECTION: &str = "Awaiting connection";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    ConnectionError,
    Disconnecting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveView {
    #[default]
    Home,
    Organizations,
    InvestmentChains,
    Reports,
    Audits,
}

/// Colour of the status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Positive,
    Info,
    Negative,
    Neutral,
}

impl ConnectionState {
    pub fn tone(self) -> StatusTone {
        match self {
            ConnectionState::Connected => StatusTone::Positive,
            ConnectionState::Connecting | ConnectionState::Disconnecting => StatusTone::Info,
            ConnectionState::ConnectionError => StatusTone::Negative,
            ConnectionState::Idle => StatusTone::Neutral,
        }
    }
}

/// Values of the connection dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionForm {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub schema: String,
    pub auth_mode: AuthMode,
    pub username: String,
    pub password: String,
    pub token: String,
    /// Kerberos realm
    pub realm: String,
    pub timeout_seconds: u32,
    pub use_ssl: bool,
    pub application_name: String,
}

impl Default for ConnectionForm {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1433,
            database: "FishEye".to_string(),
            schema: "ags_test".to_string(),
            auth_mode: AuthMode::Credentials,
            username: "sa".to_string(),
            password: String::new(),
            token: String::new(),
            realm: String::new(),
            timeout_seconds: 30,
            use_ssl: false,
            application_name: "FEMSQ UI".to_string(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ConnectionForm {
    pub fn to_request(&self) -> ConnectionTestRequest {
        let uses_credentials = self.auth_mode == AuthMode::Credentials;
        ConnectionTestRequest {
            host: self.host.trim().to_string(),
            port: self.port,
            database: self.database.trim().to_string(),
            schema: non_empty(&self.schema),
            username: non_empty(&self.username).filter(|_| uses_credentials),
            password: (!self.password.is_empty() && uses_credentials).then(|| self.password.clone()),
            auth_mode: self.auth_mode,
            realm: non_empty(&self.realm).filter(|_| self.auth_mode == AuthMode::Kerberos),
        }
    }

    /// Copy safe to keep in memory: secrets blanked.
    pub fn without_secrets(&self) -> Self {
        Self {
            password: String::new(),
            token: String::new(),
            ..self.clone()
        }
    }
}

/// Optional fields applied along with a state change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub schema: Option<String>,
    pub user: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub active_view: ActiveView,
    pub schema: String,
    pub user: String,
    pub last_message: String,
    pub last_error: String,
    pub saved_form: ConnectionForm,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            active_view: ActiveView::Home,
            schema: String::new(),
            user: String::new(),
            last_message: AWAITING_CONNECTION.to_string(),
            last_error: String::new(),
            saved_form: ConnectionForm::default(),
        }
    }
}

impl ConnectionStatus {
    pub fn organizations_enabled(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn investment_chains_enabled(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn reports_enabled(&self) -> bool {
        true
    }

    pub fn view_enabled(&self, view: ActiveView) -> bool {
        match view {
            ActiveView::Organizations => self.organizations_enabled(),
            ActiveView::InvestmentChains => self.investment_chains_enabled(),
            ActiveView::Reports => self.reports_enabled(),
            ActiveView::Home | ActiveView::Audits => true,
        }
    }

    fn apply_status(&mut self, next: ConnectionState, update: StatusUpdate) {
        self.state = next;
        if let Some(schema) = update.schema {
            self.schema = schema;
        }
        if let Some(user) = update.user {
            self.user = user;
        }
        if let Some(message) = update.message {
            self.last_message = message;
        }
        if let Some(error) = update.error {
            self.last_error = error;
        }
        if next != ConnectionState::ConnectionError {
            self.last_error.clear();
        }
        if matches!(next, ConnectionState::ConnectionError | ConnectionState::Idle) {
            self.active_view = ActiveView::Home;
        }
    }
}

/// Connection status store
pub struct ConnectionStore {
    api: Arc<FemsqApi>,
    state: RwLock<ConnectionStatus>,
    events: EventBus,
}

impl ConnectionStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ConnectionStatus::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn set_status(&self, next: ConnectionState, update: StatusUpdate) {
        {
            let mut state = self.state.write().await;
            info!(from = ?state.state, to = ?next, "Connection status change");
            state.apply_status(next, update);
        }
        self.events.emit(StoreEvent::StatusChanged);
        self.events.emit(StoreEvent::ViewChanged);
    }

    /// Switch the active view; returns false for a view disabled in the
    /// current state.
    pub async fn navigate(&self, view: ActiveView) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.view_enabled(view) {
                warn!(?view, state = ?state.state, "Navigation to disabled view refused");
                return false;
            }
            debug!(?view, "Navigate");
            state.active_view = view;
        }
        self.events.emit(StoreEvent::ViewChanged);
        true
    }

    pub async fn reset_connection(&self) {
        {
            let mut state = self.state.write().await;
            let saved_form = std::mem::take(&mut state.saved_form);
            *state = ConnectionStatus {
                saved_form,
                ..ConnectionStatus::default()
            };
        }
        info!("Connection reset");
        self.events.emit(StoreEvent::StatusChanged);
        self.events.emit(StoreEvent::ViewChanged);
    }

    pub async fn saved_form(&self) -> ConnectionForm {
        self.state.read().await.saved_form.clone()
    }

    /// Remember the dialog values; password and token are never kept.
    pub async fn update_saved_form(&self, form: &ConnectionForm) {
        self.state.write().await.saved_form = form.without_secrets();
    }

    /// Ask the backend for its current connection and mirror it.
    pub async fn refresh_status(&self) -> StoreResult<ConnectionStatusResponse> {
        match self.api.connection_status().await {
            Ok(status) => {
                let next = if status.connected {
                    ConnectionState::Connected
                } else if status.error.is_some() {
                    ConnectionState::ConnectionError
                } else {
                    ConnectionState::Idle
                };
                let update = StatusUpdate {
                    schema: status.schema.clone(),
                    message: status.message.clone(),
                    error: status.error.clone(),
                    ..Default::default()
                };
                self.set_status(next, update).await;
                Ok(status)
            }
            Err(err) => {
                warn!(error = %err, "Connection status check failed");
                self.set_status(
                    ConnectionState::ConnectionError,
                    StatusUpdate {
                        error: Some(err.to_string()),
                        ..Default::default()
                    },
                )
                .await;
                Err(err.into())
            }
        }
    }

    /// Check connection parameters without switching the backend over.
    pub async fn test_connection(&self, form: &ConnectionForm) -> StoreResult<ConnectionStatusResponse> {
        let status = self.api.test_connection(&form.to_request()).await?;
        debug!(connected = status.connected, "Connection test finished");
        Ok(status)
    }

    /// Switch the backend to `form` and track the outcome.
    pub async fn apply(&self, form: &ConnectionForm) -> StoreResult<ConnectionStatusResponse> {
        self.update_saved_form(form).await;
        self.set_status(
            ConnectionState::Connecting,
            StatusUpdate {
                message: Some(format!("Connecting to {}:{}", form.host, form.port)),
                ..Default::default()
            },
        )
        .await;

        match self.api.apply_connection(&form.to_request()).await {
            Ok(status) if status.connected => {
                let update = StatusUpdate {
                    schema: Some(status.schema.clone().unwrap_or_else(|| form.schema.clone())),
                    user: Some(form.username.clone()),
                    message: status.message.clone(),
                    error: None,
                };
                self.set_status(ConnectionState::Connected, update).await;
                Ok(status)
            }
            Ok(status) => {
                let error = status
                    .error
                    .clone()
                    .or_else(|| status.message.clone())
                    .unwrap_or_else(|| "Connection was not established".to_string());
                warn!(error = %error, "Connection refused by backend");
                self.set_status(
                    ConnectionState::ConnectionError,
                    StatusUpdate {
                        error: Some(error),
                        ..Default::default()
                    },
                )
                .await;
                Ok(status)
            }
            Err(err) => {
                warn!(error = %err, "Connection apply failed");
                self.set_status(
                    ConnectionState::ConnectionError,
                    StatusUpdate {
                        error: Some(err.to_string()),
                        ..Default::default()
                    },
                )
                .await;
                Err(err.into())
            }
        }
    }

    /// Leave the connected state locally.
    pub async fn disconnect(&self) {
        self.set_status(ConnectionState::Disconnecting, StatusUpdate::default())
            .await;
        self.reset_connection().await;
    }

    pub async fn snapshot(&self) -> ConnectionStatus {
        self.state.read().await.clone()
    }

    pub async fn state(&self) -> ConnectionState {
        self.state.read().await.state
    }

    pub async fn status_tone(&self) -> StatusTone {
        self.state.read().await.state.tone()
    }

    pub async fn active_view(&self) -> ActiveView {
        self.state.read().await.active_view
    }
}
