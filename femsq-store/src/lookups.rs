//! Reference lists used by select controls.
//!
//! [`LookupsStore`] holds file types and sender organizations, each loaded
//! once unless forced. [`KeyedLookupStore`] holds one key-to-name list per
//! [`KeyedLookupSource`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use femsq_client::{
    AuditTypeDto, FemsqApi, FileTypeDto, InvestmentProgramLookupDto, OrganizationLookup,
    PlanGroupLookupDto, Result as ApiResult, StNetworkLookupDto,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};

/// Entry of a select control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

// ==================== File types and organizations ====================

#[derive(Debug, Clone, Default)]
pub struct LookupsState {
    pub file_types: Vec<FileTypeDto>,
    pub organizations: Vec<OrganizationLookup>,
    pub loading_file_types: bool,
    pub loading_organizations: bool,
    pub file_types_loaded: bool,
    pub organizations_loaded: bool,
    /// Bumped by clearing the list; loads started earlier are not stored
    file_types_epoch: u64,
    organizations_epoch: u64,
}

pub struct LookupsStore {
    api: Arc<FemsqApi>,
    state: RwLock<LookupsState>,
    events: EventBus,
}

impl LookupsStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(LookupsState::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// File types; served from memory once loaded unless `force`.
    pub async fn load_file_types(&self, force: bool) -> StoreResult<Vec<FileTypeDto>> {
        let epoch = {
            let mut state = self.state.write().await;
            if state.file_types_loaded && !force {
                return Ok(state.file_types.clone());
            }
            state.loading_file_types = true;
            state.file_types_epoch
        };

        let result = self.api.list_file_types().await;

        let mut state = self.state.write().await;
        if state.file_types_epoch != epoch {
            debug!("Lookup list cleared while loading; result not stored");
            return result.map_err(Into::into);
        }
        state.loading_file_types = false;
        match result {
            Ok(file_types) => {
                debug!(count = file_types.len(), "File types loaded");
                state.file_types = file_types.clone();
                state.file_types_loaded = true;
                drop(state);
                self.events.emit(StoreEvent::CacheChanged);
                Ok(file_types)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load file types");
                Err(err.into())
            }
        }
    }

    /// Sender organizations; served from memory once loaded unless `force`.
    pub async fn load_organizations(&self, force: bool) -> StoreResult<Vec<OrganizationLookup>> {
        let epoch = {
            let mut state = self.state.write().await;
            if state.organizations_loaded && !force {
                return Ok(state.organizations.clone());
            }
            state.loading_organizations = true;
            state.organizations_epoch
        };

        let result = self.api.organization_lookups().await;

        let mut state = self.state.write().await;
        if state.organizations_epoch != epoch {
            debug!("Lookup list cleared while loading; result not stored");
            return result.map_err(Into::into);
        }
        state.loading_organizations = false;
        match result {
            Ok(organizations) => {
                debug!(count = organizations.len(), "Organization lookups loaded");
                state.organizations = organizations.clone();
                state.organizations_loaded = true;
                drop(state);
                self.events.emit(StoreEvent::CacheChanged);
                Ok(organizations)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load organization lookups");
                Err(err.into())
            }
        }
    }

    /// Load both lists concurrently.
    pub async fn load_all(&self, force: bool) -> StoreResult<()> {
        tokio::try_join!(self.load_file_types(force), self.load_organizations(force))?;
        Ok(())
    }

    pub async fn file_type_by_id(&self, id: i64) -> Option<FileTypeDto> {
        let state = self.state.read().await;
        state.file_types.iter().find(|ft| ft.ft_key == id).cloned()
    }

    /// Display name of a file type, `Type {id}` when unknown.
    pub async fn file_type_name(&self, id: i64) -> String {
        let state = self.state.read().await;
        state
            .file_types
            .iter()
            .find(|ft| ft.ft_key == id)
            .map(|ft| ft.ft_name.clone())
            .unwrap_or_else(|| format!("Type {}", id))
    }

    pub async fn organization_by_id(&self, id: i64) -> Option<OrganizationLookup> {
        let state = self.state.read().await;
        state.organizations.iter().find(|og| og.og_key == id).cloned()
    }

    /// Display name of a sender organization.
    pub async fn organization_name(&self, id: Option<i64>) -> String {
        let Some(id) = id else {
            return "Not specified".to_string();
        };
        let state = self.state.read().await;
        state
            .organizations
            .iter()
            .find(|og| og.og_key == id)
            .map(|og| og.og_nm.clone())
            .unwrap_or_else(|| format!("Organization {}", id))
    }

    pub async fn file_type_options(&self) -> Vec<SelectOption> {
        let state = self.state.read().await;
        state
            .file_types
            .iter()
            .map(|ft| SelectOption {
                value: ft.ft_key,
                label: ft.ft_name.clone(),
            })
            .collect()
    }

    pub async fn organization_options(&self) -> Vec<SelectOption> {
        let state = self.state.read().await;
        state
            .organizations
            .iter()
            .map(|og| SelectOption {
                value: og.og_key,
                label: og.og_nm.clone(),
            })
            .collect()
    }

    pub async fn clear_file_types(&self) {
        let mut state = self.state.write().await;
        state.file_types.clear();
        state.file_types_loaded = false;
        state.loading_file_types = false;
        state.file_types_epoch += 1;
        drop(state);
        self.events.emit(StoreEvent::CacheChanged);
    }

    pub async fn clear_organizations(&self) {
        let mut state = self.state.write().await;
        state.organizations.clear();
        state.organizations_loaded = false;
        state.loading_organizations = false;
        state.organizations_epoch += 1;
        drop(state);
        self.events.emit(StoreEvent::CacheChanged);
    }

    pub async fn clear_all(&self) {
        {
            let mut state = self.state.write().await;
            *state = LookupsState {
                file_types_epoch: state.file_types_epoch + 1,
                organizations_epoch: state.organizations_epoch + 1,
                ..LookupsState::default()
            };
        }
        self.events.emit(StoreEvent::Reset);
    }

    pub async fn snapshot(&self) -> LookupsState {
        self.state.read().await.clone()
    }
}

// ==================== Keyed lookups ====================

/// One key-to-name reference list
#[async_trait]
pub trait KeyedLookupSource: Send + Sync + 'static {
    type Entry: Debug + Clone + Send + Sync + 'static;

    const NAME: &'static str;

    fn key(entry: &Self::Entry) -> i64;
    fn name(entry: &Self::Entry) -> &str;

    async fn fetch(api: &FemsqApi) -> ApiResult<Vec<Self::Entry>>;
}

#[derive(Debug, Clone)]
pub struct KeyedLookupState<E> {
    pub entries: Vec<E>,
    pub names: HashMap<i64, String>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
    /// Bumped by `reset()`; responses to earlier requests are dropped
    epoch: u64,
}

impl<E> Default for KeyedLookupState<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            names: HashMap::new(),
            loading: false,
            error: None,
            last_updated_at: None,
            epoch: 0,
        }
    }
}

/// Key-to-name lookup store
///
/// Failures are recorded in `error`, clear the list and are returned.
pub struct KeyedLookupStore<S: KeyedLookupSource> {
    api: Arc<FemsqApi>,
    state: RwLock<KeyedLookupState<S::Entry>>,
    events: EventBus,
}

impl<S: KeyedLookupSource> KeyedLookupStore<S> {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(KeyedLookupState::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Load the list; a call made while one is in flight returns immediately.
    pub async fn fetch(&self) -> StoreResult<()> {
        let epoch = {
            let mut state = self.state.write().await;
            if state.loading {
                return Ok(());
            }
            state.loading = true;
            state.error = None;
            state.epoch
        };

        let result = S::fetch(&self.api).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!(lookup = S::NAME, "Dropping lookup response from before reset");
            return result.map(|_| ()).map_err(Into::into);
        }
        state.loading = false;
        match result {
            Ok(entries) => {
                debug!(lookup = S::NAME, count = entries.len(), "Lookup loaded");
                state.names = entries
                    .iter()
                    .map(|entry| (S::key(entry), S::name(entry).to_string()))
                    .collect();
                state.entries = entries;
                state.last_updated_at = Some(Utc::now());
                drop(state);
                self.events.emit(StoreEvent::ListChanged);
                Ok(())
            }
            Err(err) => {
                warn!(lookup = S::NAME, error = %err, "Lookup fetch failed");
                state.error = Some(err.to_string());
                state.entries.clear();
                state.names.clear();
                drop(state);
                self.events.emit(StoreEvent::ErrorChanged);
                Err(err.into())
            }
        }
    }

    /// Name for `key`, if loaded.
    pub async fn name_of(&self, key: Option<i64>) -> Option<String> {
        let key = key?;
        self.state.read().await.names.get(&key).cloned()
    }

    pub async fn entries(&self) -> Vec<S::Entry> {
        self.state.read().await.entries.clone()
    }

    pub async fn options(&self) -> Vec<SelectOption> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .map(|entry| SelectOption {
                value: S::key(entry),
                label: S::name(entry).to_string(),
            })
            .collect()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> KeyedLookupState<S::Entry> {
        self.state.read().await.clone()
    }

    /// Restore defaults; a response already in flight is dropped.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            *state = KeyedLookupState {
                epoch: state.epoch + 1,
                ..KeyedLookupState::default()
            };
        }
        self.events.emit(StoreEvent::Reset);
    }
}

pub struct InvestmentProgramsSource;

#[async_trait]
impl KeyedLookupSource for InvestmentProgramsSource {
    type Entry = InvestmentProgramLookupDto;
    const NAME: &'static str = "investment-programs";

    fn key(entry: &Self::Entry) -> i64 {
        entry.ipg_key
    }

    fn name(entry: &Self::Entry) -> &str {
        &entry.name
    }

    async fn fetch(api: &FemsqApi) -> ApiResult<Vec<Self::Entry>> {
        api.investment_programs().await
    }
}

pub struct PlanGroupsSource;

#[async_trait]
impl KeyedLookupSource for PlanGroupsSource {
    type Entry = PlanGroupLookupDto;
    const NAME: &'static str = "plan-groups";

    fn key(entry: &Self::Entry) -> i64 {
        entry.plan_group_key
    }

    fn name(entry: &Self::Entry) -> &str {
        &entry.name
    }

    async fn fetch(api: &FemsqApi) -> ApiResult<Vec<Self::Entry>> {
        api.plan_groups().await
    }
}

pub struct StNetworksSource;

#[async_trait]
impl KeyedLookupSource for StNetworksSource {
    type Entry = StNetworkLookupDto;
    const NAME: &'static str = "st-networks";

    fn key(entry: &Self::Entry) -> i64 {
        entry.st_net_key
    }

    fn name(entry: &Self::Entry) -> &str {
        &entry.name
    }

    async fn fetch(api: &FemsqApi) -> ApiResult<Vec<Self::Entry>> {
        api.st_networks().await
    }
}

pub struct AuditTypesSource;

#[async_trait]
impl KeyedLookupSource for AuditTypesSource {
    type Entry = AuditTypeDto;
    const NAME: &'static str = "audit-types";

    fn key(entry: &Self::Entry) -> i64 {
        entry.at_key
    }

    fn name(entry: &Self::Entry) -> &str {
        &entry.at_name
    }

    async fn fetch(api: &FemsqApi) -> ApiResult<Vec<Self::Entry>> {
        api.audit_types().await
    }
}

pub type InvestmentProgramsStore = KeyedLookupStore<InvestmentProgramsSource>;
pub type PlanGroupsStore = KeyedLookupStore<PlanGroupsSource>;
pub type StNetworksStore = KeyedLookupStore<StNetworksSource>;
pub type AuditTypesStore = KeyedLookupStore<AuditTypesSource>;
