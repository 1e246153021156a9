//! Audits ("revisions")

use chrono::{DateTime, Utc};
use femsq_client::{AuditDto, AuditRequest, FemsqApi};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};

#[derive(Debug, Clone, Default)]
pub struct AuditsState {
    pub audits: Vec<AuditDto>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Bumped by `reset()`; responses to earlier requests are dropped
    epoch: u64,
}

/// Audit list with create, update and delete
///
/// Reads record failures in `error` and swallow them; writes record and
/// return them so a form can stay open.
pub struct AuditsStore {
    api: Arc<FemsqApi>,
    state: RwLock<AuditsState>,
    events: EventBus,
}

impl AuditsStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(AuditsState::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn fetch_audits(&self) {
        let epoch = {
            let mut state = self.state.write().await;
            if state.loading {
                return;
            }
            state.loading = true;
            state.error = None;
            state.epoch
        };
        self.events.emit(StoreEvent::LoadingChanged);

        let result = self.api.list_audits().await;

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                debug!("Dropping audit list response from before reset");
                return;
            }
            match result {
                Ok(audits) => {
                    debug!(count = audits.len(), "Audits loaded");
                    state.audits = audits;
                    state.last_updated_at = Some(Utc::now());
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load audits");
                    state.error = Some(err.to_string());
                    state.audits.clear();
                }
            }
            state.loading = false;
        }
        self.events.emit(StoreEvent::ListChanged);
        self.events.emit(StoreEvent::LoadingChanged);
    }

    /// One audit; `None` on failure.
    pub async fn fetch_audit(&self, id: i64) -> Option<AuditDto> {
        let epoch = self.state.read().await.epoch;
        match self.api.get_audit(id).await {
            Ok(audit) => Some(audit),
            Err(err) => {
                warn!(audit_id = id, error = %err, "Failed to load audit");
                self.record_error(epoch, Some(err.to_string())).await;
                None
            }
        }
    }

    pub async fn create_audit(&self, request: &AuditRequest) -> StoreResult<AuditDto> {
        let epoch = self.begin_write().await;
        match self.api.create_audit(request).await {
            Ok(created) => {
                info!(audit_id = created.adt_key, name = %created.adt_name, "Audit created");
                let entry = created.clone();
                self.apply_write(epoch, move |audits| audits.push(entry)).await;
                Ok(created)
            }
            Err(err) => {
                error!(error = %err, "Failed to create audit");
                self.record_error(epoch, Some(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn update_audit(&self, id: i64, request: &AuditRequest) -> StoreResult<AuditDto> {
        let epoch = self.begin_write().await;
        match self.api.update_audit(id, request).await {
            Ok(updated) => {
                let replacement = updated.clone();
                self.apply_write(epoch, move |audits| {
                    if let Some(slot) = audits.iter_mut().find(|a| a.adt_key == id) {
                        *slot = replacement;
                    }
                })
                .await;
                Ok(updated)
            }
            Err(err) => {
                error!(audit_id = id, error = %err, "Failed to update audit");
                self.record_error(epoch, Some(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn delete_audit(&self, id: i64) -> StoreResult<()> {
        let epoch = self.begin_write().await;
        match self.api.delete_audit(id).await {
            Ok(()) => {
                info!(audit_id = id, "Audit deleted");
                self.apply_write(epoch, |audits| audits.retain(|a| a.adt_key != id))
                    .await;
                Ok(())
            }
            Err(err) => {
                error!(audit_id = id, error = %err, "Failed to delete audit");
                self.record_error(epoch, Some(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn clear_error(&self) {
        let epoch = self.state.read().await.epoch;
        self.record_error(epoch, None).await;
    }

    /// Clear the error ahead of a write and return the current epoch.
    async fn begin_write(&self) -> u64 {
        let epoch = self.state.read().await.epoch;
        self.record_error(epoch, None).await;
        epoch
    }

    /// Apply a confirmed write to the list unless the store was reset meanwhile.
    async fn apply_write(&self, epoch: u64, change: impl FnOnce(&mut Vec<AuditDto>)) {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            change(&mut state.audits);
        }
        self.events.emit(StoreEvent::ListChanged);
    }

    async fn record_error(&self, epoch: u64, error: Option<String>) {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            state.error = error;
        }
        self.events.emit(StoreEvent::ErrorChanged);
    }

    /// Restore defaults; responses to requests already in flight are dropped.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            *state = AuditsState {
                epoch: state.epoch + 1,
                ..AuditsState::default()
            };
        }
        self.events.emit(StoreEvent::Reset);
    }

    pub async fn snapshot(&self) -> AuditsState {
        self.state.read().await.clone()
    }

    pub async fn audits(&self) -> Vec<AuditDto> {
        self.state.read().await.audits.clone()
    }

    pub async fn has_audits(&self) -> bool {
        !self.state.read().await.audits.is_empty()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }
}
