//! Files under review.

use femsq_client::{FemsqApi, FileDto, FileRequest};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};

#[derive(Debug, Clone, Default)]
pub struct FilesState {
    pub files: Vec<FileDto>,
    /// Directory of the last `load_by_directory`
    pub current_dir_id: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped by `clear()`; responses to earlier requests are dropped
    epoch: u64,
}

/// Display order: numbered files first by `af_num`, then unnumbered; ties by `af_key`.
pub fn display_order(a: &FileDto, b: &FileDto) -> Ordering {
    match (a.af_num, b.af_num) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.af_key.cmp(&b.af_key)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.af_key.cmp(&b.af_key),
    }
}

/// File list of a directory with create, update and delete
///
/// Every action records failures in `error` and returns them.
pub struct FilesStore {
    api: Arc<FemsqApi>,
    state: RwLock<FilesState>,
    events: EventBus,
}

impl FilesStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(FilesState::default()),
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

    /// Apply a response to the state unless the store was cleared since `epoch`.
    async fn commit(&self, epoch: u64, change: impl FnOnce(&mut FilesState)) {
        let mut state = self.state.write().await;
        if state.epoch == epoch {
            change(&mut *state);
        }
    }

    async fn finish(&self, epoch: u64, outcome: Result<(), String>) {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            state.loading = false;
            if let Err(message) = &outcome {
                state.error = Some(message.clone());
            }
        }
        match outcome {
            Ok(()) => self.events.emit(StoreEvent::ListChanged),
            Err(_) => self.events.emit(StoreEvent::ErrorChanged),
        }
    }

    pub async fn load_by_directory(&self, dir_id: i64) -> StoreResult<()> {
        let epoch = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.current_dir_id = Some(dir_id);
            state.epoch
        };
        match self.api.directory_files(dir_id).await {
            Ok(files) => {
                debug!(dir_id, count = files.len(), "Directory files loaded");
                self.commit(epoch, |state| state.files = files).await;
                self.finish(epoch, Ok(())).await;
                Ok(())
            }
            Err(err) => {
                error!(dir_id, error = %err, "Failed to load directory files");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn load_all(&self) -> StoreResult<()> {
        let epoch = self.begin().await;
        match self.api.list_files().await {
            Ok(files) => {
                debug!(count = files.len(), "Files loaded");
                self.commit(epoch, |state| state.files = files).await;
                self.finish(epoch, Ok(())).await;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to load files");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    /// Load one file and upsert it into the list.
    pub async fn load_by_id(&self, id: i64) -> StoreResult<FileDto> {
        let epoch = self.begin().await;
        match self.api.get_file(id).await {
            Ok(file) => {
                self.commit(epoch, |state| match state.files.iter_mut().find(|f| f.af_key == id) {
                    Some(slot) => *slot = file.clone(),
                    None => state.files.push(file.clone()),
                })
                .await;
                self.finish(epoch, Ok(())).await;
                Ok(file)
            }
            Err(err) => {
                error!(file_id = id, error = %err, "Failed to load file");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn create(&self, request: &FileRequest) -> StoreResult<FileDto> {
        let epoch = self.begin().await;
        match self.api.create_file(request).await {
            Ok(created) => {
                info!(file_id = created.af_key, name = %created.af_name, "File created");
                self.commit(epoch, |state| state.files.push(created.clone())).await;
                self.finish(epoch, Ok(())).await;
                Ok(created)
            }
            Err(err) => {
                error!(error = %err, "Failed to create file");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn update(&self, id: i64, request: &FileRequest) -> StoreResult<FileDto> {
        let epoch = self.begin().await;
        match self.api.update_file(id, request).await {
            Ok(updated) => {
                self.commit(epoch, |state| {
                    if let Some(slot) = state.files.iter_mut().find(|f| f.af_key == id) {
                        *slot = updated.clone();
                    }
                })
                .await;
                self.finish(epoch, Ok(())).await;
                Ok(updated)
            }
            Err(err) => {
                error!(file_id = id, error = %err, "Failed to update file");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let epoch = self.begin().await;
        match self.api.delete_file(id).await {
            Ok(()) => {
                self.commit(epoch, |state| state.files.retain(|f| f.af_key != id))
                    .await;
                info!(file_id = id, "File deleted");
                self.finish(epoch, Ok(())).await;
                Ok(())
            }
            Err(err) => {
                error!(file_id = id, error = %err, "Failed to delete file");
                self.finish(epoch, Err(err.to_string())).await;
                Err(err.into())
            }
        }
    }

    pub async fn files(&self) -> Vec<FileDto> {
        self.state.read().await.files.clone()
    }

    pub async fn files_in_directory(&self, dir_id: i64) -> Vec<FileDto> {
        let state = self.state.read().await;
        state.files.iter().filter(|f| f.af_dir == dir_id).cloned().collect()
    }

    pub async fn file_by_id(&self, id: i64) -> Option<FileDto> {
        let state = self.state.read().await;
        state.files.iter().find(|f| f.af_key == id).cloned()
    }

    pub async fn files_of_type(&self, type_id: i64) -> Vec<FileDto> {
        let state = self.state.read().await;
        state.files.iter().filter(|f| f.af_type == type_id).cloned().collect()
    }

    pub async fn sorted_files(&self) -> Vec<FileDto> {
        let mut files = self.files().await;
        files.sort_by(display_order);
        files
    }

    pub async fn current_dir_id(&self) -> Option<i64> {
        self.state.read().await.current_dir_id
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.files.clear();
            state.current_dir_id = None;
            state.error = None;
            state.loading = false;
            state.epoch += 1;
        }
        self.events.emit(StoreEvent::Reset);
    }

    pub async fn snapshot(&self) -> FilesState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(af_key: i64, af_num: Option<i64>) -> FileDto {
        FileDto {
            af_key,
            af_name: format!("f{}", af_key),
            af_dir: 1,
            af_type: 1,
            af_execute: false,
            af_source: None,
            af_created: None,
            af_updated: None,
            ra_org_sender: None,
            af_num,
        }
    }

    #[test]
    fn test_display_order() {
        let mut files = vec![
            file(5, None),
            file(4, Some(2)),
            file(1, None),
            file(3, Some(1)),
            file(2, Some(2)),
        ];
        files.sort_by(display_order);

        let keys: Vec<i64> = files.iter().map(|f| f.af_key).collect();
        assert_eq!(keys, vec![3, 2, 4, 1, 5]);
    }
}
