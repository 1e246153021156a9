//! Audits, directories, files, lookups and connection over MockTransport.

use femsq_client::{AuditRequest, FemsqApi, FileRequest, Method, MockReply, MockTransport};
use femsq_store::{
    ActiveView, AuditsStore, ConnectionForm, ConnectionState, ConnectionStore, DirectoriesStore,
    FemsqApp, FilesStore, LookupsStore, PlanGroupsStore, SelectOption, StatusTone, StNetworksStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn api(mock: &Arc<MockTransport>) -> Arc<FemsqApi> {
    Arc::new(FemsqApi::new(mock.clone()))
}

fn audit(key: i64, name: &str) -> Value {
    json!({ "adtKey": key, "adtName": name, "adtDir": 1, "adtType": 2, "adtAddRA": false })
}

fn file(key: i64, num: Option<i64>, file_type: i64) -> Value {
    json!({
        "afKey": key, "afName": format!("f{}.xlsx", key), "afDir": 3, "afType": file_type,
        "afExecute": true, "afNum": num
    })
}

fn audit_request(name: &str) -> AuditRequest {
    AuditRequest {
        adt_name: name.into(),
        adt_date: None,
        adt_results: None,
        adt_dir: 1,
        adt_type: 2,
        adt_add_ra: false,
    }
}

// ==================== Audits ====================

#[tokio::test]
async fn test_audit_lifecycle() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::Get, "ra/audits", MockReply::Json(json!([audit(1, "Q1")])));
    mock.on(Method::Post, "ra/audits", MockReply::Json(audit(2, "Q2")));
    mock.on(Method::Put, "ra/audits/2", MockReply::Json(audit(2, "Q2 final")));
    mock.on(Method::Delete, "ra/audits/1", MockReply::Empty);
    let store = AuditsStore::new(api(&mock));

    store.fetch_audits().await;
    assert!(store.has_audits().await);

    let created = store.create_audit(&audit_request("Q2")).await.unwrap();
    assert_eq!(created.adt_key, 2);
    assert_eq!(store.audits().await.len(), 2);

    store.update_audit(2, &audit_request("Q2 final")).await.unwrap();
    assert_ok!(store.delete_audit(1).await);

    let audits = store.audits().await;
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].adt_name, "Q2 final");
    assert!(store.error().await.is_none());
}

#[tokio::test]
async fn test_audit_write_failure_is_recorded_and_returned() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Post,
        "ra/audits",
        MockReply::Status {
            status: 409,
            body: json!({ "message": "Audit name already exists" }),
        },
    );
    let store = AuditsStore::new(api(&mock));

    let err = store.create_audit(&audit_request("Q1")).await.unwrap_err();
    assert_eq!(err.to_string(), "Audit name already exists");
    assert_eq!(store.error().await.as_deref(), Some("Audit name already exists"));

    store.clear_error().await;
    assert!(store.error().await.is_none());
}

#[tokio::test]
async fn test_audit_read_failure_is_swallowed() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::Get, "ra/audits", MockReply::Network);
    let store = AuditsStore::new(api(&mock));

    store.fetch_audits().await;
    assert!(store.error().await.is_some());
    assert!(!store.has_audits().await);
    assert!(store.fetch_audit(9).await.is_none());
}

// ==================== Directories and files ====================

#[tokio::test]
async fn test_directory_of_audit_becomes_current() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "ra/directories",
        MockReply::Json(json!([{ "key": 1, "dirName": "2023", "dir": "/d/2023" }])),
    );
    mock.on(
        Method::Get,
        "ra/audits/5/directory",
        MockReply::Json(json!({ "key": 2, "dirName": "2024", "dir": "/d/2024" })),
    );
    let store = DirectoriesStore::new(api(&mock));

    store.load_all().await.unwrap();
    let dir = store.load_by_audit(5).await.unwrap();

    assert_eq!(store.current_directory().await, Some(dir));
    assert_eq!(
        store.options().await,
        vec![
            SelectOption { value: 1, label: "2023".into() },
            SelectOption { value: 2, label: "2024".into() },
        ]
    );

    store.clear().await;
    assert!(store.directories().await.is_empty());
    assert!(store.current_directory().await.is_none());
}

#[tokio::test]
async fn test_directory_failure_is_returned() {
    let mock = Arc::new(MockTransport::new());
    let store = DirectoriesStore::new(api(&mock));

    assert!(store.load_by_id(77).await.is_err());
    assert_eq!(store.error().await.as_deref(), Some("No mock route"));
}

#[tokio::test]
async fn test_files_of_directory() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "ra/directories/3/files",
        MockReply::Json(json!([file(10, None, 1), file(11, Some(2), 1), file(12, Some(1), 4)])),
    );
    mock.on(Method::Post, "ra/files", MockReply::Json(file(13, Some(3), 4)));
    mock.on(Method::Delete, "ra/files/10", MockReply::Empty);
    let store = FilesStore::new(api(&mock));

    store.load_by_directory(3).await.unwrap();
    assert_eq!(store.current_dir_id().await, Some(3));

    let keys: Vec<i64> = store.sorted_files().await.iter().map(|f| f.af_key).collect();
    assert_eq!(keys, vec![12, 11, 10]);
    assert_eq!(store.files_of_type(4).await.len(), 1);

    let request = FileRequest {
        af_name: "f13.xlsx".into(),
        af_dir: 3,
        af_type: 4,
        af_execute: true,
        af_source: None,
        ra_org_sender: Some(8),
        af_num: Some(3),
    };
    store.create(&request).await.unwrap();
    store.delete(10).await.unwrap();

    assert_eq!(store.files_in_directory(3).await.len(), 3);
    assert!(store.file_by_id(10).await.is_none());
    assert!(store.file_by_id(13).await.is_some());
}

#[tokio::test]
async fn test_file_update_failure_keeps_list() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::Get, "ra/files", MockReply::Json(json!([file(1, None, 1)])));
    mock.on(
        Method::Put,
        "ra/files/1",
        MockReply::Status { status: 400, body: json!({ "message": "Name is required" }) },
    );
    let store = FilesStore::new(api(&mock));
    store.load_all().await.unwrap();

    let request = FileRequest {
        af_name: String::new(),
        af_dir: 3,
        af_type: 1,
        af_execute: true,
        af_source: None,
        ra_org_sender: None,
        af_num: None,
    };
    assert!(store.update(1, &request).await.is_err());

    assert_eq!(store.files().await[0].af_name, "f1.xlsx");
    assert_eq!(store.error().await.as_deref(), Some("Name is required"));
}

// ==================== Lookups ====================

#[tokio::test]
async fn test_lookups_load_once_unless_forced() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "ra/file-types",
        MockReply::Json(json!([{ "ftKey": 1, "ftName": "Report" }])),
    );
    mock.on(
        Method::Get,
        "og",
        MockReply::Json(json!([{ "ogKey": 8, "ogName": "Alpha" }])),
    );
    let store = LookupsStore::new(api(&mock));

    store.load_all(false).await.unwrap();
    store.load_all(false).await.unwrap();
    assert_eq!(mock.call_count(Method::Get, "ra/file-types"), 1);
    assert_eq!(mock.call_count(Method::Get, "og"), 1);

    store.load_file_types(true).await.unwrap();
    assert_eq!(mock.call_count(Method::Get, "ra/file-types"), 2);

    assert_eq!(store.file_type_name(1).await, "Report");
    assert_eq!(store.file_type_name(9).await, "Type 9");
    assert_eq!(store.organization_name(Some(8)).await, "Alpha");
    assert_eq!(store.organization_name(Some(3)).await, "Organization 3");
    assert_eq!(store.organization_name(None).await, "Not specified");

    store.clear_all().await;
    assert_eq!(store.file_type_name(1).await, "Type 1");
}

#[tokio::test]
async fn test_keyed_lookup_names_and_failure() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Get,
        "v1/lookups/plan-groups",
        MockReply::Json(json!([
            { "planGroupKey": 1, "name": "Capital" },
            { "planGroupKey": 2, "name": "Repairs" }
        ])),
    );
    mock.on(Method::Get, "v1/lookups/st-networks", MockReply::Network);

    let plan_groups = PlanGroupsStore::new(api(&mock));
    plan_groups.fetch().await.unwrap();
    assert_eq!(plan_groups.name_of(Some(2)).await.as_deref(), Some("Repairs"));
    assert_eq!(plan_groups.name_of(Some(5)).await, None);
    assert_eq!(plan_groups.name_of(None).await, None);
    assert_eq!(plan_groups.options().await.len(), 2);

    let networks = StNetworksStore::new(api(&mock));
    assert!(networks.fetch().await.is_err());
    assert!(networks.error().await.is_some());
    assert!(networks.entries().await.is_empty());
}

// ==================== Connection ====================

#[tokio::test]
async fn test_views_gated_by_connection() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Post,
        "v1/connection/apply",
        MockReply::Json(json!({ "connected": true, "schema": "ags", "message": "Connected" })),
    );
    let store = ConnectionStore::new(api(&mock));

    assert!(!store.navigate(ActiveView::Organizations).await);
    assert!(store.navigate(ActiveView::Reports).await);
    assert_eq!(store.status_tone().await, StatusTone::Neutral);

    let form = ConnectionForm {
        password: "secret".into(),
        ..Default::default()
    };
    store.apply(&form).await.unwrap();

    let status = store.snapshot().await;
    assert_eq!(status.state, ConnectionState::Connected);
    assert_eq!(status.schema, "ags");
    assert_eq!(status.user, "sa");
    assert!(status.saved_form.password.is_empty());
    assert_eq!(store.status_tone().await, StatusTone::Positive);

    let body = mock
        .last_call(Method::Post, "v1/connection/apply")
        .and_then(|c| c.body)
        .unwrap();
    assert_eq!(body["password"], json!("secret"));
    assert_eq!(body["authMode"], json!("credentials"));

    assert!(store.navigate(ActiveView::Organizations).await);
    assert_eq!(store.active_view().await, ActiveView::Organizations);

    store.disconnect().await;
    assert_eq!(store.state().await, ConnectionState::Idle);
    assert_eq!(store.active_view().await, ActiveView::Home);
    assert_eq!(store.snapshot().await.last_message, "Awaiting connection");
    assert_eq!(store.saved_form().await.host, "localhost");
}

#[tokio::test]
async fn test_refused_connection_goes_to_error() {
    let mock = Arc::new(MockTransport::new());
    mock.on(
        Method::Post,
        "v1/connection/apply",
        MockReply::Json(json!({ "connected": false, "error": "Login failed for user 'sa'" })),
    );
    mock.on(Method::Get, "v1/connection/status", MockReply::Timeout);
    let store = ConnectionStore::new(api(&mock));

    let status = store.apply(&ConnectionForm::default()).await.unwrap();
    assert!(!status.connected);
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.state, ConnectionState::ConnectionError);
    assert_eq!(snapshot.last_error, "Login failed for user 'sa'");
    assert_eq!(store.status_tone().await, StatusTone::Negative);

    assert!(store.refresh_status().await.is_err());
    let call = mock.last_call(Method::Get, "v1/connection/status").unwrap();
    assert_eq!(call.timeout, Some(std::time::Duration::from_secs(30)));
}

// ==================== Composition ====================

#[tokio::test]
async fn test_app_shares_one_transport() {
    let mock = Arc::new(MockTransport::new());
    mock.on(Method::Get, "ra/audits", MockReply::Json(json!([audit(1, "Q1")])));
    mock.on(
        Method::Get,
        "v1/reports/available",
        MockReply::Json(json!([{ "id": "a", "name": "A", "source": "embedded" }])),
    );
    let app = FemsqApp::with_transport(mock.clone());

    app.audits.fetch_audits().await;
    app.reports.load_reports().await;
    assert_eq!(mock.calls().len(), 2);
    assert!(app.audits.has_audits().await);

    app.reset_all().await;
    assert!(!app.audits.has_audits().await);
    assert!(!app.reports.has_data().await);
    assert_eq!(app.connection.state().await, ConnectionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_reset_all_drops_in_flight_loads() {
    let mock = Arc::new(MockTransport::new());
    let delay = Duration::from_millis(100);
    mock.on_delayed(Method::Get, "ra/audits", MockReply::Json(json!([audit(1, "Q1")])), delay);
    mock.on_delayed(Method::Get, "ra/files", MockReply::Json(json!([file(1, None, 1)])), delay);
    mock.on_delayed(
        Method::Get,
        "ra/file-types",
        MockReply::Json(json!([{ "ftKey": 1, "ftName": "Report" }])),
        delay,
    );
    mock.on_delayed(
        Method::Get,
        "v1/lookups/plan-groups",
        MockReply::Json(json!([{ "planGroupKey": 1, "name": "Capital" }])),
        delay,
    );
    let app = FemsqApp::with_transport(mock.clone());

    let (_, files, file_types, plan_groups, _) = tokio::join!(
        app.audits.fetch_audits(),
        app.files.load_all(),
        app.lookups.load_file_types(false),
        app.plan_groups.fetch(),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.reset_all().await;
        }
    );

    assert_ok!(files);
    assert_eq!(file_types.unwrap().len(), 1);
    assert_ok!(plan_groups);

    assert!(!app.audits.has_audits().await);
    assert!(!app.audits.snapshot().await.loading);
    assert!(app.files.files().await.is_empty());
    assert!(!app.files.snapshot().await.loading);
    let lookups = app.lookups.snapshot().await;
    assert!(lookups.file_types.is_empty());
    assert!(!lookups.file_types_loaded);
    assert!(!lookups.loading_file_types);
    assert!(app.plan_groups.entries().await.is_empty());

    app.lookups.load_file_types(false).await.unwrap();
    assert_eq!(mock.call_count(Method::Get, "ra/file-types"), 2);
}
