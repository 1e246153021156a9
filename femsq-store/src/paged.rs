//! Paginated master-detail store.
//!
//! One [`PagedStore`] holds a page of entities, at most one selected entity
//! and the dependent list of that selection (agents of an organization,
//! relations of a chain). What differs per entity lives in a
//! [`PagedSource`].
//!
//! # Page convention
//!
//! The UI page is one-based, the wire page is zero-based:
//! `wire = ui - 1` on the way out, `ui = server_index + 1` on the way back.
//!
//! # Staleness
//!
//! State sits behind a `RwLock` that is never held across a request. After
//! each request the store re-checks what it captured before sending:
//! - a list response is dropped if `reset()` ran meanwhile;
//! - a dependents response is dropped unless it belongs to the newest
//!   dependents request and its key is still selected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use femsq_client::{FemsqApi, Page, Query, Result as ApiResult};
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::events::{EventBus, StoreEvent};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Entity-specific half of a paged store
#[async_trait]
pub trait PagedSource: Debug + Clone + Default + Send + Sync + 'static {
    /// Row type held in the list
    type Item: Debug + Clone + Send + Sync + 'static;
    /// Row type of the dependent list
    type Dependent: Debug + Clone + Send + Sync + 'static;
    /// Entity key
    type Key: Debug + Display + Copy + Eq + Hash + Send + Sync + 'static;

    /// Store name used in logs
    const NAME: &'static str;
    /// Initial sort token, `field,direction`
    const DEFAULT_SORT: &'static str;
    /// Accepted filter names, also their wire query names
    const FILTERS: &'static [&'static str];

    fn key(item: &Self::Item) -> Self::Key;

    /// Translate a UI sort token into the backend's field names.
    fn wire_sort(sort: &str) -> String {
        sort.to_string()
    }

    /// Record on a row that its dependents were loaded.
    fn record_dependents(_item: &mut Self::Item, _dependents: &[Self::Dependent]) {}

    async fn fetch_page(&self, api: &FemsqApi, query: Query) -> ApiResult<Page<Self::Item>>;

    async fn fetch_dependents(&self, api: &FemsqApi, key: Self::Key) -> ApiResult<Vec<Self::Dependent>>;
}

/// Scalar filter value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterValue {
    #[default]
    Empty,
    Text(String),
    Number(i64),
}

impl FilterValue {
    /// Value sent on the wire; blank text and `Empty` are omitted.
    pub fn wire_value(&self) -> Option<String> {
        match self {
            FilterValue::Empty => None,
            FilterValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            FilterValue::Number(n) => Some(n.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.wire_value().is_none()
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Pagination and sort state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// One-based UI page
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    /// `field,direction`
    pub sort: String,
}

impl Pagination {
    fn new(sort: &str) -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            total_elements: 0,
            total_pages: 0,
            sort: sort.to_string(),
        }
    }
}

/// Snapshot of a paged store
#[derive(Debug, Clone)]
pub struct PagedState<S: PagedSource> {
    pub items: Vec<S::Item>,
    pub selected_key: Option<S::Key>,
    pub dependents: Vec<S::Dependent>,
    pub loading: bool,
    pub dependents_loading: bool,
    pub error: Option<String>,
    pub dependents_error: Option<String>,
    pub pagination: Pagination,
    pub filters: BTreeMap<String, FilterValue>,
    /// Time of the last successful list fetch
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl<S: PagedSource> PagedState<S> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            selected_key: None,
            dependents: Vec::new(),
            loading: false,
            dependents_loading: false,
            error: None,
            dependents_error: None,
            pagination: Pagination::new(S::DEFAULT_SORT),
            filters: S::FILTERS
                .iter()
                .map(|name| (name.to_string(), FilterValue::Empty))
                .collect(),
            last_updated_at: None,
        }
    }

    pub fn selected(&self) -> Option<&S::Item> {
        let key = self.selected_key?;
        self.items.iter().find(|item| S::key(item) == key)
    }

    fn wire_query(&self) -> Query {
        let query = Query::new()
            .with("page", self.pagination.page.saturating_sub(1))
            .with("size", self.pagination.size)
            .with("sort", S::wire_sort(&self.pagination.sort));

        self.filters
            .iter()
            .fold(query, |query, (name, value)| query.with_opt(name.clone(), value.wire_value()))
    }

    fn apply_page(&mut self, page: Page<S::Item>) {
        let len = page.content.len();
        self.items = page.content;
        self.pagination.total_elements = page.total_elements.unwrap_or(len as u64);
        let size = page.size.filter(|s| *s > 0).unwrap_or(self.pagination.size);
        self.pagination.total_pages = match (page.total_pages, page.total_elements) {
            (Some(pages), _) => pages,
            (None, Some(total)) if size > 0 => {
                u32::try_from(total.div_ceil(u64::from(size))).unwrap_or(u32::MAX)
            }
            _ if len > 0 => 1,
            _ => 0,
        };

        match page.page_index {
            Some(index) => self.pagination.page = index.saturating_add(1),
            None => {
                let total_pages = self.pagination.total_pages;
                if total_pages > 0 && self.pagination.page > total_pages {
                    self.pagination.page = total_pages;
                }
            }
        }
    }

    fn next_selection(&self, previous: Option<S::Key>) -> Option<S::Key> {
        if let Some(previous) = previous {
            if self.items.iter().any(|item| S::key(item) == previous) {
                return Some(previous);
            }
        }
        self.items.first().map(S::key)
    }
}

struct Inner<S: PagedSource> {
    state: PagedState<S>,
    /// Bumped by `reset()`; list responses from an older epoch are dropped
    epoch: u64,
    /// Bumped for every dependents request
    dependents_generation: u64,
}

/// Paginated master-detail store
pub struct PagedStore<S: PagedSource> {
    api: Arc<FemsqApi>,
    source: S,
    inner: RwLock<Inner<S>>,
    events: EventBus,
}

impl<S: PagedSource> PagedStore<S> {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self::with_source(api, S::default())
    }

    pub fn with_source(api: Arc<FemsqApi>, source: S) -> Self {
        Self {
            api,
            source,
            inner: RwLock::new(Inner {
                state: PagedState::new(),
                epoch: 0,
                dependents_generation: 0,
            }),
            events: EventBus::new(),
        }
    }

    /// Subscribe to change events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Fetch the current page.
    ///
    /// A call made while another list fetch is in flight returns immediately.
    /// With `keep_selection`, the previous selection survives if it is still
    /// on the page; otherwise the first row is selected. The selection's
    /// dependents are fetched before this returns.
    pub async fn fetch_list(&self, keep_selection: bool) -> StoreResult<()> {
        let (query, previous, epoch) = {
            let mut inner = self.inner.write().await;
            if inner.state.loading {
                debug!(store = S::NAME, "List fetch already in flight");
                return Ok(());
            }
            inner.state.loading = true;
            inner.state.error = None;
            let previous = if keep_selection {
                inner.state.selected_key
            } else {
                None
            };
            (inner.state.wire_query(), previous, inner.epoch)
        };
        self.events.emit(StoreEvent::LoadingChanged);

        debug!(store = S::NAME, ?query, "Fetching list");
        let result = self.source.fetch_page(&self.api, query).await;

        match result {
            Ok(page) => {
                let selection = {
                    let mut inner = self.inner.write().await;
                    if inner.epoch != epoch {
                        debug!(store = S::NAME, "Dropping list response after reset");
                        return Ok(());
                    }
                    let state = &mut inner.state;
                    state.apply_page(page);
                    state.last_updated_at = Some(Utc::now());
                    let next = state.next_selection(previous);
                    state.selected_key = next;
                    if next.is_none() {
                        state.dependents.clear();
                    }
                    info!(
                        store = S::NAME,
                        items = state.items.len(),
                        page = state.pagination.page,
                        total_elements = state.pagination.total_elements,
                        "List loaded"
                    );
                    next
                };
                self.events.emit(StoreEvent::ListChanged);
                self.events.emit(StoreEvent::SelectionChanged);

                if let Some(key) = selection {
                    self.fetch_dependents(key, true).await;
                } else {
                    self.events.emit(StoreEvent::DependentsChanged);
                }

                self.finish_loading(epoch).await;
                Ok(())
            }
            Err(err) => {
                {
                    let mut inner = self.inner.write().await;
                    if inner.epoch != epoch {
                        return Err(err.into());
                    }
                    let state = &mut inner.state;
                    state.error = Some(err.to_string());
                    state.items.clear();
                    state.selected_key = None;
                    state.dependents.clear();
                    state.pagination.total_elements = 0;
                    state.pagination.total_pages = 0;
                    state.loading = false;
                }
                error!(store = S::NAME, error = %err, status = err.status(), "List fetch failed");
                self.events.emit(StoreEvent::ErrorChanged);
                self.events.emit(StoreEvent::ListChanged);
                self.events.emit(StoreEvent::LoadingChanged);
                Err(err.into())
            }
        }
    }

    async fn finish_loading(&self, epoch: u64) {
        let mut inner = self.inner.write().await;
        if inner.epoch == epoch {
            inner.state.loading = false;
            drop(inner);
            self.events.emit(StoreEvent::LoadingChanged);
        }
    }

    /// Fetch the dependents of `key`.
    ///
    /// Without `force`, does nothing unless `key` is selected. Failures are
    /// recorded in `dependents_error`, never returned.
    pub async fn fetch_dependents(&self, key: S::Key, force: bool) {
        let generation = {
            let mut inner = self.inner.write().await;
            if !force && inner.state.selected_key != Some(key) {
                debug!(store = S::NAME, %key, "Skipping dependents of unselected entity");
                return;
            }
            inner.dependents_generation += 1;
            inner.state.dependents_loading = true;
            inner.state.dependents_error = None;
            inner.dependents_generation
        };
        self.events.emit(StoreEvent::LoadingChanged);

        let result = self.source.fetch_dependents(&self.api, key).await;

        {
            let mut inner = self.inner.write().await;
            if inner.dependents_generation != generation {
                debug!(store = S::NAME, %key, "Dropping superseded dependents response");
                return;
            }
            inner.state.dependents_loading = false;
            if inner.state.selected_key != Some(key) {
                debug!(store = S::NAME, %key, "Dropping dependents of deselected entity");
                drop(inner);
                self.events.emit(StoreEvent::LoadingChanged);
                return;
            }

            let state = &mut inner.state;
            match result {
                Ok(dependents) => {
                    if let Some(item) = state.items.iter_mut().find(|item| S::key(item) == key) {
                        S::record_dependents(item, &dependents);
                    }
                    debug!(store = S::NAME, %key, count = dependents.len(), "Dependents loaded");
                    state.dependents = dependents;
                }
                Err(err) => {
                    warn!(store = S::NAME, %key, error = %err, "Dependents fetch failed");
                    state.dependents_error = Some(err.to_string());
                    state.dependents.clear();
                }
            }
        }
        self.events.emit(StoreEvent::DependentsChanged);
        self.events.emit(StoreEvent::LoadingChanged);
    }

    /// Select an entity and load its dependents.
    ///
    /// Re-selecting the current entity is a no-op while its dependents are
    /// loaded without error.
    pub async fn select_entity(&self, key: S::Key) {
        {
            let mut inner = self.inner.write().await;
            let state = &inner.state;
            if state.selected_key == Some(key)
                && !state.dependents.is_empty()
                && state.dependents_error.is_none()
            {
                return;
            }
            inner.state.selected_key = Some(key);
        }
        self.events.emit(StoreEvent::SelectionChanged);
        self.fetch_dependents(key, true).await;
    }

    /// Navigate to a one-based page; 0 is treated as 1. Keeps the selection.
    pub async fn set_page(&self, page: u32) -> StoreResult<()> {
        let page = page.max(DEFAULT_PAGE);
        {
            let mut inner = self.inner.write().await;
            if inner.state.pagination.page == page {
                return Ok(());
            }
            inner.state.pagination.page = page;
        }
        self.fetch_list(true).await
    }

    /// Change the page size; 0 is rejected.
    pub async fn set_page_size(&self, size: u32) -> StoreResult<()> {
        if size == 0 {
            warn!(store = S::NAME, size, "Rejected invalid page size");
            return Err(StoreError::InvalidInput(format!("page size must be positive, got {}", size)));
        }
        {
            let mut inner = self.inner.write().await;
            if inner.state.pagination.size == size {
                return Ok(());
            }
            inner.state.pagination.size = size;
            inner.state.pagination.page = DEFAULT_PAGE;
        }
        self.fetch_list(false).await
    }

    /// Change the sort token (`field,direction`).
    pub async fn set_sort(&self, sort: impl Into<String>) -> StoreResult<()> {
        let sort = sort.into();
        if sort.trim().is_empty() {
            warn!(store = S::NAME, "Rejected empty sort token");
            return Err(StoreError::InvalidInput("sort token must not be empty".to_string()));
        }
        {
            let mut inner = self.inner.write().await;
            if inner.state.pagination.sort == sort {
                return Ok(());
            }
            inner.state.pagination.sort = sort;
            inner.state.pagination.page = DEFAULT_PAGE;
        }
        self.fetch_list(false).await
    }

    /// Change one named filter.
    pub async fn update_filter(&self, name: &str, value: impl Into<FilterValue>) -> StoreResult<()> {
        let value = value.into();
        {
            let mut inner = self.inner.write().await;
            let Some(current) = inner.state.filters.get_mut(name) else {
                warn!(store = S::NAME, filter = name, "Rejected unknown filter");
                return Err(StoreError::InvalidInput(format!(
                    "unknown filter '{}' for {}",
                    name,
                    S::NAME
                )));
            };
            if *current == value {
                return Ok(());
            }
            *current = value;
            inner.state.pagination.page = DEFAULT_PAGE;
        }
        self.fetch_list(false).await
    }

    /// Restore every field to its initial value. No request is made; responses
    /// still in flight are dropped when they arrive.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.state = PagedState::new();
            inner.epoch += 1;
            inner.dependents_generation += 1;
        }
        debug!(store = S::NAME, "Store reset");
        self.events.emit(StoreEvent::Reset);
    }

    // ==================== Accessors ====================

    pub async fn snapshot(&self) -> PagedState<S> {
        self.inner.read().await.state.clone()
    }

    pub async fn items(&self) -> Vec<S::Item> {
        self.inner.read().await.state.items.clone()
    }

    pub async fn selected_key(&self) -> Option<S::Key> {
        self.inner.read().await.state.selected_key
    }

    pub async fn selected(&self) -> Option<S::Item> {
        self.inner.read().await.state.selected().cloned()
    }

    pub async fn dependents(&self) -> Vec<S::Dependent> {
        self.inner.read().await.state.dependents.clone()
    }

    pub async fn pagination(&self) -> Pagination {
        self.inner.read().await.state.pagination.clone()
    }

    pub async fn filters(&self) -> BTreeMap<String, FilterValue> {
        self.inner.read().await.state.filters.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.state.error.clone()
    }

    pub async fn dependents_error(&self) -> Option<String> {
        self.inner.read().await.state.dependents_error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.state.loading
    }

    pub async fn has_items(&self) -> bool {
        !self.inner.read().await.state.items.is_empty()
    }
}
