//! Audit directories.

use femsq_client::{DirectoryDto, FemsqApi};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};
use crate::lookups::SelectOption;

#[derive(Debug, Clone, Default)]
pub struct DirectoriesState {
    pub directories: Vec<DirectoryDto>,
    pub current_directory: Option<DirectoryDto>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped by `clear()`; responses to earlier requests are dropped
    epoch: u64,
}

impl DirectoriesState {
    fn upsert(&mut self, directory: DirectoryDto) {
        match self.directories.iter_mut().find(|d| d.key == directory.key) {
            Some(slot) => *slot = directory,
            None => self.directories.push(directory),
        }
    }
}

/// Directory list plus the directory of the audit being edited
///
/// Every load records failures in `error` and returns them.
pub struct DirectoriesStore {
    api: Arc<FemsqApi>,
    state: RwLock<DirectoriesState>,
    events: EventBus,
}

impl DirectoriesStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(DirectoriesState::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
        state.epoch
    }

    async fn fail(&self, epoch: u64, message: String) {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            state.loading = false;
            state.error = Some(message);
        }
        self.events.emit(StoreEvent::ErrorChanged);
    }

    pub async fn load_all(&self) -> StoreResult<Vec<DirectoryDto>> {
        let epoch = self.begin().await;
        match self.api.list_directories().await {
            Ok(directories) => {
                debug!(count = directories.len(), "Directories loaded");
                {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        return Ok(directories);
                    }
                    state.directories = directories.clone();
                    state.loading = false;
                }
                self.events.emit(StoreEvent::ListChanged);
                Ok(directories)
            }
            Err(err) => {
                error!(error = %err, "Failed to load directories");
                self.fail(epoch, err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Load one directory and upsert it into the list.
    pub async fn load_by_id(&self, id: i64) -> StoreResult<DirectoryDto> {
        let epoch = self.begin().await;
        match self.api.get_directory(id).await {
            Ok(directory) => {
                {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        return Ok(directory);
                    }
                    state.upsert(directory.clone());
                    state.loading = false;
                }
                self.events.emit(StoreEvent::ListChanged);
                Ok(directory)
            }
            Err(err) => {
                error!(dir_id = id, error = %err, "Failed to load directory");
                self.fail(epoch, err.to_string()).await;
                Err(err.into())
            }
        }
    }

    /// Load the directory of an audit, make it current and upsert it.
    pub async fn load_by_audit(&self, audit_id: i64) -> StoreResult<DirectoryDto> {
        let epoch = self.begin().await;
        match self.api.audit_directory(audit_id).await {
            Ok(directory) => {
                {
                    let mut state = self.state.write().await;
                    if state.epoch != epoch {
                        return Ok(directory);
                    }
                    state.current_directory = Some(directory.clone());
                    state.upsert(directory.clone());
                    state.loading = false;
                }
                self.events.emit(StoreEvent::ListChanged);
                self.events.emit(StoreEvent::SelectionChanged);
                Ok(directory)
            }
            Err(err) => {
                error!(audit_id, error = %err, "Failed to load audit directory");
                self.fail(epoch, err.to_string()).await;
                Err(err.into())
            }
        }
    }

    pub async fn set_current_directory(&self, directory: Option<DirectoryDto>) {
        self.state.write().await.current_directory = directory;
        self.events.emit(StoreEvent::SelectionChanged);
    }

    pub async fn current_directory(&self) -> Option<DirectoryDto> {
        self.state.read().await.current_directory.clone()
    }

    pub async fn directory_by_id(&self, id: i64) -> Option<DirectoryDto> {
        let state = self.state.read().await;
        state.directories.iter().find(|d| d.key == id).cloned()
    }

    pub async fn directories(&self) -> Vec<DirectoryDto> {
        self.state.read().await.directories.clone()
    }

    pub async fn options(&self) -> Vec<SelectOption> {
        let state = self.state.read().await;
        state
            .directories
            .iter()
            .map(|d| SelectOption {
                value: d.key,
                label: d.dir_name.clone(),
            })
            .collect()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.directories.clear();
            state.current_directory = None;
            state.error = None;
            state.loading = false;
            state.epoch += 1;
        }
        self.events.emit(StoreEvent::Reset);
    }

    pub async fn snapshot(&self) -> DirectoriesState {
        self.state.read().await.clone()
    }
}
