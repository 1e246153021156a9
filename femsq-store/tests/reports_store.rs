//! Report catalog store over MockTransport.

use femsq_client::{FemsqApi, Method, MockReply, MockTransport, ReportFormat, ReportGenerationRequest};
use femsq_store::context::{are_all_required_parameters_filled, resolve_parameters, Context};
use femsq_store::ReportsStore;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn store(mock: &Arc<MockTransport>) -> ReportsStore {
    ReportsStore::new(Arc::new(FemsqApi::new(mock.clone())))
}

fn metadata_json() -> Value {
    json!({
        "id": "contractor-card",
        "version": "1.0",
        "name": "Contractor card",
        "files": { "template": "contractor-card.jrxml" },
        "parameters": [
            { "name": "contractorId", "type": "long", "label": "Contractor", "required": true },
            { "name": "asOf", "type": "date", "label": "As of", "required": true, "defaultValue": "today" }
        ]
    })
}

fn context(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_metadata_is_fetched_once() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/contractor-card/metadata",
        MockReply::Json(metadata_json()),
    );
    let reports = store(&mock);

    let first = reports.load_metadata("contractor-card").await.unwrap();
    let second = reports.load_metadata("contractor-card").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.parameters.len(), 2);
    assert_eq!(
        mock.call_count(Method::Get, "v1/reports/contractor-card/metadata"),
        1
    );

    reports.clear_metadata_cache().await;
    reports.load_metadata("contractor-card").await.unwrap();
    assert_eq!(
        mock.call_count(Method::Get, "v1/reports/contractor-card/metadata"),
        2
    );
}

#[tokio::test]
async fn test_parameters_cached_per_context() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/r1/parameters",
        MockReply::Json(json!([{ "name": "year", "type": "integer", "label": "Year" }])),
    );
    let reports = store(&mock);
    let path = "v1/reports/r1/parameters";

    let a = context(&[("ogKey", "1")]);
    let b = context(&[("ogKey", "2")]);

    assert_eq!(reports.load_parameters("r1", &a).await.len(), 1);
    reports.load_parameters("r1", &a).await;
    assert_eq!(mock.call_count(Method::Get, path), 1);
    assert_eq!(
        mock.last_call(Method::Get, path).unwrap().query.get("ogKey"),
        Some("1")
    );

    reports.load_parameters("r1", &b).await;
    reports.load_parameters("r1", &b).await;
    assert_eq!(mock.call_count(Method::Get, path), 2);
    assert_eq!(reports.snapshot().await.parameters_cache.len(), 2);
}

#[tokio::test]
async fn test_failed_metadata_records_error() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/missing/metadata",
        MockReply::Status {
            status: 404,
            body: json!({ "message": "Report not found: missing" }),
        },
    );
    let reports = store(&mock);

    assert!(reports.load_metadata("missing").await.is_none());
    assert_eq!(reports.error().await.as_deref(), Some("Report not found: missing"));
    assert!(reports.snapshot().await.metadata_cache.is_empty());
}

#[tokio::test]
async fn test_catalog_load_uses_filters_and_derives_views() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/available",
        MockReply::Json(json!([
            { "id": "a", "name": "Agents", "category": "orgs", "tags": ["daily"], "source": "embedded" },
            { "id": "b", "name": "Budget", "category": "orgs", "tags": ["yearly"], "source": "external" }
        ])),
    );
    let reports = store(&mock);

    reports.set_category("orgs").await;
    reports.load_reports().await;

    let call = mock.last_call(Method::Get, "v1/reports/available").unwrap();
    assert_eq!(call.query.get("category"), Some("orgs"));
    assert_eq!(call.query.get("tag"), None);

    assert!(reports.has_data().await);
    assert_eq!(reports.total().await, 2);
    assert!(reports.snapshot().await.last_loaded_at.is_some());

    reports.set_search("BUD").await;
    assert_eq!(reports.filtered_total().await, 1);
    assert_eq!(reports.filtered_reports().await[0].id, "b");

    reports.reset().await;
    assert_eq!(reports.total().await, 0);
    assert!(reports.snapshot().await.filters.category.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_catalog_load_is_guarded() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(
        Method::Get,
        "v1/reports/available",
        MockReply::Json(json!([])),
        Duration::from_millis(50),
    );
    let reports = store(&mock);

    tokio::join!(reports.load_reports(), reports.load_reports());

    assert_eq!(mock.call_count(Method::Get, "v1/reports/available"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_drops_in_flight_catalog_and_metadata() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(
        Method::Get,
        "v1/reports/available",
        MockReply::Json(json!([{ "id": "a", "name": "Agents", "source": "embedded" }])),
        Duration::from_millis(100),
    );
    mock.on_delayed(
        Method::Get,
        "v1/reports/contractor-card/metadata",
        MockReply::Json(metadata_json()),
        Duration::from_millis(100),
    );
    let reports = store(&mock);

    let (_, metadata, _) = tokio::join!(
        reports.load_reports(),
        reports.load_metadata("contractor-card"),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            reports.reset().await;
        }
    );

    assert!(metadata.is_some());
    let state = reports.snapshot().await;
    assert!(state.reports.is_empty());
    assert!(state.metadata_cache.is_empty());
    assert!(state.last_loaded_at.is_none());
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn test_load_after_reset_owns_loading_flag() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(
        Method::Get,
        "v1/reports/available",
        MockReply::Json(json!([{ "id": "a", "name": "Agents", "source": "embedded" }])),
        Duration::from_millis(100),
    );
    let reports = store(&mock);

    tokio::join!(
        reports.load_reports(),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            reports.reset().await;
            reports.load_reports().await;
        },
        async {
            // the first response has landed and been dropped, the second is in flight
            tokio::time::sleep(Duration::from_millis(105)).await;
            let state = reports.snapshot().await;
            assert!(state.loading);
            assert!(state.reports.is_empty());
        }
    );

    assert_eq!(mock.call_count(Method::Get, "v1/reports/available"), 2);
    assert_eq!(reports.total().await, 1);
    assert!(!reports.snapshot().await.loading);
}

#[tokio::test(start_paused = true)]
async fn test_cache_clear_during_load_is_not_undone() {
    let mock = Arc::new(MockTransport::new());
    mock.on_delayed(
        Method::Get,
        "v1/reports/contractor-card/metadata",
        MockReply::Json(metadata_json()),
        Duration::from_millis(50),
    );
    let reports = store(&mock);

    tokio::join!(reports.load_metadata("contractor-card"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        reports.clear_metadata_cache().await;
    });

    assert!(reports.snapshot().await.metadata_cache.is_empty());
}

#[tokio::test]
async fn test_catalog_failure_is_swallowed() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::Get, "v1/reports/available", MockReply::Timeout);
    mock.on(Method::Get, "v1/reports/categories", MockReply::Network);
    let reports = store(&mock);

    reports.load_reports().await;
    assert!(reports.error().await.is_some());
    assert!(!reports.has_data().await);

    reports.load_categories().await;
    assert!(reports.snapshot().await.categories.is_empty());
}

#[tokio::test]
async fn test_generate_returns_bytes_or_error() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Post,
        "v1/reports/card/generate",
        MockReply::Bytes(b"%PDF-1.7".to_vec()),
    );
    mock.on(
        Method::Post,
        "v1/reports/card/preview",
        MockReply::Status {
            status: 500,
            body: json!({ "error": "Template failed to compile" }),
        },
    );
    let reports = store(&mock);

    let mut parameters = BTreeMap::new();
    parameters.insert("contractorId".to_string(), json!(42));
    let request = ReportGenerationRequest {
        report_id: "card".into(),
        parameters: parameters.clone(),
        format: ReportFormat::Pdf,
    };

    let bytes = reports.generate(&request).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let body = mock
        .last_call(Method::Post, "v1/reports/card/generate")
        .and_then(|c| c.body)
        .unwrap();
    assert_eq!(body["reportId"], json!("card"));
    assert_eq!(body["parameters"]["contractorId"], json!(42));

    let err = reports.generate_preview("card", &parameters).await.unwrap_err();
    assert!(err.api_error().is_some());
    assert!(reports.error().await.is_some());
}

#[tokio::test]
async fn test_parameter_source_failure_gives_empty_options() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/parameters/source/card/ogKey",
        MockReply::Json(json!([{ "value": 1, "label": "Alpha" }, { "value": "b", "label": "Beta" }])),
    );
    let reports = store(&mock);

    let options = reports.load_parameter_source_options("card", "ogKey").await;
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].value, json!(1));

    let none = reports.load_parameter_source_options("card", "unknown").await;
    assert!(none.is_empty());
    assert!(reports.error().await.is_some());
}

#[tokio::test]
async fn test_context_menu_flow() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/reports/contractor-card/metadata",
        MockReply::Json(metadata_json()),
    );
    let reports = store(&mock);
    let metadata = reports.load_metadata("contractor-card").await.unwrap();

    let mapping: BTreeMap<String, String> = [
        ("contractorId".to_string(), "${contractorId}".to_string()),
        ("unknown".to_string(), "${notInContext}".to_string()),
    ]
    .into_iter()
    .collect();

    let mut ctx = Context::new();
    ctx.insert("contractorId".into(), json!(42));

    let resolved = resolve_parameters(&mapping, &ctx);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved["contractorId"], json!(42));
    assert!(are_all_required_parameters_filled(&metadata, &resolved));

    let empty = resolve_parameters(&mapping, &Context::new());
    assert!(empty.is_empty());
    assert!(!are_all_required_parameters_filled(&metadata, &empty));
}
