//! Report catalog, metadata and generation.

use chrono::{DateTime, Utc};
use femsq_client::{
    FemsqApi, ParameterOption, ReportGenerationRequest, ReportInfo, ReportMetadata, ReportParameter,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::StoreResult;
use crate::events::{EventBus, StoreEvent};

/// Catalog filters; empty strings mean "any"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    pub category: String,
    pub tag: String,
    pub search: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportsState {
    pub reports: Vec<ReportInfo>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_loaded_at: Option<DateTime<Utc>>,
    pub filters: ReportFilters,
    pub metadata_cache: HashMap<String, ReportMetadata>,
    pub parameters_cache: HashMap<String, Vec<ReportParameter>>,
    /// Bumped by `reset()`; responses to earlier requests are dropped
    epoch: u64,
    /// Bumped by `reset()` and the cache clears
    cache_epoch: u64,
}

/// Reports matching every active filter.
///
/// Search is a case-insensitive substring of the name or description.
pub fn filter_reports<'a>(reports: &'a [ReportInfo], filters: &ReportFilters) -> Vec<&'a ReportInfo> {
    let search = filters.search.to_lowercase();
    reports
        .iter()
        .filter(|r| filters.category.is_empty() || r.category.as_deref() == Some(filters.category.as_str()))
        .filter(|r| filters.tag.is_empty() || r.tags.iter().any(|t| *t == filters.tag))
        .filter(|r| {
            search.is_empty()
                || r.name.to_lowercase().contains(&search)
                || r
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&search))
        })
        .collect()
}

/// Cache key of a parameter request: `id:` followed by the context as JSON.
pub fn parameters_cache_key(report_id: &str, context: &BTreeMap<String, String>) -> String {
    format!(
        "{}:{}",
        report_id,
        serde_json::to_string(context).unwrap_or_default()
    )
}

/// Report catalog store
///
/// Reads record failures in `error` and return an empty result. Generation
/// records the failure and returns it.
pub struct ReportsStore {
    api: Arc<FemsqApi>,
    state: RwLock<ReportsState>,
    events: EventBus,
}

impl ReportsStore {
    pub fn new(api: Arc<FemsqApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ReportsState::default()),
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Clear the error ahead of a request and return the current epoch.
    async fn begin_request(&self) -> u64 {
        let epoch = {
            let mut state = self.state.write().await;
            state.error = None;
            state.epoch
        };
        self.events.emit(StoreEvent::ErrorChanged);
        epoch
    }

    /// Record a failure unless the store was reset since `epoch`.
    async fn record_error(&self, epoch: u64, message: String) {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            state.error = Some(message);
        }
        self.events.emit(StoreEvent::ErrorChanged);
    }

    async fn epochs(&self) -> (u64, u64) {
        let state = self.state.read().await;
        (state.epoch, state.cache_epoch)
    }

    /// Load the catalog narrowed by the current category and tag.
    pub async fn load_reports(&self) {
        let (category, tag, epoch) = {
            let mut state = self.state.write().await;
            if state.loading {
                debug!("Report catalog load already in flight");
                return;
            }
            state.loading = true;
            state.error = None;
            (state.filters.category.clone(), state.filters.tag.clone(), state.epoch)
        };
        self.events.emit(StoreEvent::LoadingChanged);

        let result = self
            .api
            .available_reports(
                (!category.is_empty()).then_some(category.as_str()),
                (!tag.is_empty()).then_some(tag.as_str()),
            )
            .await;

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                debug!("Dropping report catalog response from before reset");
                return;
            }
            match result {
                Ok(reports) => {
                    info!(count = reports.len(), "Report catalog loaded");
                    state.reports = reports;
                    state.last_loaded_at = Some(Utc::now());
                }
                Err(err) => {
                    warn!(error = %err, "Failed to load report catalog");
                    state.error = Some(err.to_string());
                    state.reports.clear();
                }
            }
            state.loading = false;
        }
        self.events.emit(StoreEvent::ListChanged);
        self.events.emit(StoreEvent::LoadingChanged);
    }

    /// Report metadata, cached by id.
    pub async fn load_metadata(&self, report_id: &str) -> Option<ReportMetadata> {
        let (epoch, cache_epoch) = {
            let state = self.state.read().await;
            if let Some(cached) = state.metadata_cache.get(report_id) {
                return Some(cached.clone());
            }
            (state.epoch, state.cache_epoch)
        };

        match self.api.report_metadata(report_id).await {
            Ok(metadata) => {
                {
                    let mut state = self.state.write().await;
                    if state.cache_epoch != cache_epoch {
                        debug!(report_id, "Metadata cache cleared while loading; not caching");
                        return Some(metadata);
                    }
                    state
                        .metadata_cache
                        .insert(report_id.to_string(), metadata.clone());
                }
                self.events.emit(StoreEvent::CacheChanged);
                Some(metadata)
            }
            Err(err) => {
                warn!(report_id, error = %err, "Failed to load report metadata");
                self.record_error(epoch, err.to_string()).await;
                None
            }
        }
    }

    /// Parameter definitions for a context, cached per report and context.
    pub async fn load_parameters(
        &self,
        report_id: &str,
        context: &BTreeMap<String, String>,
    ) -> Vec<ReportParameter> {
        let key = parameters_cache_key(report_id, context);
        let (epoch, cache_epoch) = {
            let state = self.state.read().await;
            if let Some(cached) = state.parameters_cache.get(&key) {
                return cached.clone();
            }
            (state.epoch, state.cache_epoch)
        };

        match self.api.report_parameters(report_id, context).await {
            Ok(parameters) => {
                {
                    let mut state = self.state.write().await;
                    if state.cache_epoch != cache_epoch {
                        return parameters;
                    }
                    state.parameters_cache.insert(key, parameters.clone());
                }
                self.events.emit(StoreEvent::CacheChanged);
                parameters
            }
            Err(err) => {
                warn!(report_id, error = %err, "Failed to load report parameters");
                self.record_error(epoch, err.to_string()).await;
                Vec::new()
            }
        }
    }

    pub async fn load_categories(&self) {
        let (epoch, _) = self.epochs().await;
        let result = self.api.report_categories().await;
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return;
        }
        match result {
            Ok(categories) => state.categories = categories,
            Err(err) => {
                warn!(error = %err, "Failed to load report categories");
                state.error = Some(err.to_string());
                state.categories.clear();
            }
        }
        drop(state);
        self.events.emit(StoreEvent::ListChanged);
    }

    pub async fn load_tags(&self) {
        let (epoch, _) = self.epochs().await;
        let result = self.api.report_tags().await;
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return;
        }
        match result {
            Ok(tags) => state.tags = tags,
            Err(err) => {
                warn!(error = %err, "Failed to load report tags");
                state.error = Some(err.to_string());
                state.tags.clear();
            }
        }
        drop(state);
        self.events.emit(StoreEvent::ListChanged);
    }

    /// Render a report, returning the document bytes.
    pub async fn generate(&self, request: &ReportGenerationRequest) -> StoreResult<Vec<u8>> {
        let epoch = self.begin_request().await;
        match self.api.generate_report(request).await {
            Ok(bytes) => {
                info!(report_id = %request.report_id, bytes = bytes.len(), "Report generated");
                Ok(bytes)
            }
            Err(err) => {
                error!(report_id = %request.report_id, error = %err, "Report generation failed");
                self.record_error(epoch, err.to_string()).await;
                Err(err.into())
            }
        }
    }

    pub async fn generate_preview(
        &self,
        report_id: &str,
        parameters: &BTreeMap<String, Value>,
    ) -> StoreResult<Vec<u8>> {
        let epoch = self.begin_request().await;
        match self.api.generate_preview(report_id, parameters).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                error!(report_id, error = %err, "Report preview failed");
                self.record_error(epoch, err.to_string()).await;
                Err(err.into())
            }
        }
    }

    pub async fn load_parameter_source_options(
        &self,
        report_id: &str,
        parameter: &str,
    ) -> Vec<ParameterOption> {
        let (epoch, _) = self.epochs().await;
        match self.api.parameter_source_options(report_id, parameter).await {
            Ok(options) => options,
            Err(err) => {
                warn!(report_id, parameter, error = %err, "Failed to load parameter options");
                self.record_error(epoch, err.to_string()).await;
                Vec::new()
            }
        }
    }

    // ==================== Filters ====================

    pub async fn set_category(&self, category: impl Into<String>) {
        self.state.write().await.filters.category = category.into();
        self.events.emit(StoreEvent::ListChanged);
    }

    pub async fn set_tag(&self, tag: impl Into<String>) {
        self.state.write().await.filters.tag = tag.into();
        self.events.emit(StoreEvent::ListChanged);
    }

    pub async fn set_search(&self, search: impl Into<String>) {
        self.state.write().await.filters.search = search.into();
        self.events.emit(StoreEvent::ListChanged);
    }

    // ==================== Derived ====================

    pub async fn filtered_reports(&self) -> Vec<ReportInfo> {
        let state = self.state.read().await;
        filter_reports(&state.reports, &state.filters)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn total(&self) -> usize {
        self.state.read().await.reports.len()
    }

    pub async fn filtered_total(&self) -> usize {
        let state = self.state.read().await;
        filter_reports(&state.reports, &state.filters).len()
    }

    pub async fn has_data(&self) -> bool {
        !self.state.read().await.reports.is_empty()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn snapshot(&self) -> ReportsState {
        self.state.read().await.clone()
    }

    // ==================== Reset ====================

    pub async fn clear_metadata_cache(&self) {
        {
            let mut state = self.state.write().await;
            state.metadata_cache.clear();
            state.cache_epoch += 1;
        }
        self.events.emit(StoreEvent::CacheChanged);
    }

    pub async fn clear_parameters_cache(&self) {
        {
            let mut state = self.state.write().await;
            state.parameters_cache.clear();
            state.cache_epoch += 1;
        }
        self.events.emit(StoreEvent::CacheChanged);
    }

    /// Restore defaults; responses to requests already in flight are dropped.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().await;
            *state = ReportsState {
                epoch: state.epoch + 1,
                cache_epoch: state.cache_epoch + 1,
                ..ReportsState::default()
            };
        }
        self.events.emit(StoreEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<ReportInfo> {
        serde_json::from_value(json!([
            { "id": "a", "name": "Agents list", "category": "orgs", "tags": ["daily"], "source": "embedded" },
            { "id": "b", "name": "Chain summary", "description": "Yearly AGENT totals",
              "category": "chains", "tags": ["yearly"], "source": "embedded" },
            { "id": "c", "name": "Card", "category": "orgs", "tags": ["daily", "print"], "source": "external" }
        ]))
        .unwrap()
    }

    fn ids(reports: Vec<&ReportInfo>) -> Vec<&str> {
        reports.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_filters_are_combined() {
        let reports = catalog();

        let all = ReportFilters::default();
        assert_eq!(ids(filter_reports(&reports, &all)), vec!["a", "b", "c"]);

        let search = ReportFilters { search: "agent".into(), ..Default::default() };
        assert_eq!(ids(filter_reports(&reports, &search)), vec!["a", "b"]);

        let narrowed = ReportFilters {
            category: "orgs".into(),
            tag: "daily".into(),
            search: "CARD".into(),
        };
        assert_eq!(ids(filter_reports(&reports, &narrowed)), vec!["c"]);
    }

    #[test]
    fn test_parameters_cache_key_is_order_independent() {
        let mut a = BTreeMap::new();
        a.insert("year".to_string(), "2024".to_string());
        a.insert("ogKey".to_string(), "1".to_string());
        let mut b = BTreeMap::new();
        b.insert("ogKey".to_string(), "1".to_string());
        b.insert("year".to_string(), "2024".to_string());

        assert_eq!(parameters_cache_key("r", &a), parameters_cache_key("r", &b));
        assert_eq!(parameters_cache_key("r", &BTreeMap::new()), "r:{}");
    }
}
