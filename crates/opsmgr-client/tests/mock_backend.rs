//! Mock backend tests for the opsmgr client.
//!
//! These tests use wiremock to simulate an Operations Manager backend
//! and exercise the client's behavior without network access or real
//! credentials: session establishment, de-duplicated re-authentication,
//! retry semantics, and both fan-out failure policies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opsmgr_client::OpsClient;
use opsmgr_core::error::AuthError;
use opsmgr_core::{ConnectionSettings, Error, QueryRequest};

const AUTH_PATH: &str = "/OperationsManager/authenticate";
const ALERT_PATH: &str = "/OperationsManager/data/alert";

/// Helper to build settings pointing at a mock server.
fn mock_settings(server: &MockServer) -> ConnectionSettings {
    ConnectionSettings::new(&server.uri(), "CONTOSO\\reader", "secret123").unwrap()
}

/// A successful login response carrying both session cookies.
fn login_response(session: &str, csrf: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .append_header(
            "set-cookie",
            format!("SCOMSessionId={session}; Path=/; HttpOnly").as_str(),
        )
        .append_header(
            "set-cookie",
            format!("SCOM-CSRF-TOKEN={csrf}; Path=/").as_str(),
        )
}

fn alerts_body() -> serde_json::Value {
    json!({
        "tableColumns": [],
        "rows": [{
            "id": "a1",
            "severity": "2",
            "monitoringobjectdisplayname": "SQL01",
            "name": "Disk full",
            "age": "3 days",
            "ageinmilliseconds": 259200000.0,
            "repeatcount": 4,
            "description": "Volume C: is full",
            "monitoringobjectid": "o1",
            "monitoringclassid": "c1"
        }]
    })
}

// ============================================================================
// Credential exchange
// ============================================================================

#[tokio::test]
async fn connect_decorates_requests_with_session_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(header(
            "authorization",
            format!("Basic {}", STANDARD.encode("CONTOSO\\reader:secret123")).as_str(),
        ))
        .respond_with(login_response("sess-1", "tok%2Fen"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .and(header("Cookie", "SCOMSessionId=sess-1"))
        .and(header("SCOM-CSRF-TOKEN", "tok/en"))
        .and(header(
            "authorization",
            format!("Basic {}", STANDARD.encode("CONTOSO\\reader:secret123")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let alerts = client.get_alerts("Severity = 2").await.unwrap();

    assert_eq!(alerts.rows.len(), 1);
    assert_eq!(alerts.rows[0].monitoring_object, "SQL01");
    assert_eq!(alerts.rows[0].repeat_count, 4);
}

#[tokio::test]
async fn login_missing_csrf_cookie_is_incomplete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "SCOMSessionId=sess-1; Path=/"),
        )
        .mount(&server)
        .await;

    let result = OpsClient::connect(mock_settings(&server)).await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::IncompleteSession)
    ));
}

#[tokio::test]
async fn login_rejection_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = OpsClient::connect(mock_settings(&server)).await;
    assert!(matches!(
        result.unwrap_err(),
        Error::Auth(AuthError::Rejected { status: 401 })
    ));
}

#[tokio::test]
async fn check_health_follows_the_configured_exchange() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(header(
            "authorization",
            format!("Basic {}", STANDARD.encode("CONTOSO\\reader:secret123")).as_str(),
        ))
        .respond_with(login_response("sess-1", "csrf-1"))
        .expect(1)
        .mount(&server)
        .await;

    let status = OpsClient::check_health(&mock_settings(&server)).await;
    assert!(status.ok);

    let rejecting = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&rejecting)
        .await;

    let status = OpsClient::check_health(&mock_settings(&rejecting)).await;
    assert!(!status.ok);
}

// ============================================================================
// Session expiry and re-authentication
// ============================================================================

#[tokio::test]
async fn concurrent_expiry_performs_a_single_reauthentication() {
    let server = MockServer::start().await;

    // First login hands out the stale session, the second the fresh
    // one. Exactly two logins total is the single-flight assertion.
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-old", "csrf-old"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-new", "csrf-new"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .and(header("Cookie", "SCOMSessionId=sess-old"))
        .respond_with(ResponseTemplate::new(440))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .and(header("Cookie", "SCOMSessionId=sess-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();

    let calls = (0..8).map(|_| client.get_alerts("Severity = 2"));
    let results = join_all(calls).await;

    for result in results {
        assert_eq!(result.unwrap().rows.len(), 1);
    }
}

#[tokio::test]
async fn retry_replays_the_original_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-old", "csrf-old"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-new", "csrf-new"))
        .mount(&server)
        .await;

    let expected_body = json!({
        "criteria": "Severity = 2",
        "displayColumns": [
            "severity", "monitoringobjectdisplayname", "name", "age",
            "repeatcount", "description", "monitoringobjectid", "monitoringclassid"
        ],
        "classId": ""
    });

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .and(header("Cookie", "SCOMSessionId=sess-old"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(440))
        .expect(1)
        .mount(&server)
        .await;

    // The retried request only matches when the body comes through
    // byte-for-byte identical.
    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .and(header("Cookie", "SCOMSessionId=sess-new"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let alerts = client.get_alerts("Severity = 2").await.unwrap();
    assert_eq!(alerts.rows.len(), 1);
}

#[tokio::test]
async fn second_expiry_exhausts_the_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-1", "csrf-1"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .respond_with(ResponseTemplate::new(440))
        .expect(2)
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let err = client.get_alerts("Severity = 2").await.unwrap_err();
    assert!(matches!(err, Error::SessionRetryExhausted));
}

#[tokio::test]
async fn refresh_failure_reports_the_original_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-1", "csrf-1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .respond_with(ResponseTemplate::new(440))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let err = client.get_alerts("Severity = 2").await.unwrap_err();

    match err {
        Error::Auth(AuthError::RefreshFailed {
            original_status,
            source,
        }) => {
            assert_eq!(original_status, 440);
            assert!(matches!(
                *source,
                Error::Auth(AuthError::Rejected { status: 500 })
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Fan-out failure policies
// ============================================================================

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(login_response("sess-1", "csrf-1"))
        .mount(server)
        .await;
}

fn health_body(object_id: &str, state: &str) -> serde_json::Value {
    json!({
        "childNodeDatas": [],
        "alertCount": 1,
        "healthState": state,
        "objectId": object_id
    })
}

async fn mount_health_states(server: &MockServer) {
    for (id, template) in [
        (
            "A",
            ResponseTemplate::new(200).set_body_json(health_body("A", "Success")),
        ),
        (
            "B",
            ResponseTemplate::new(500).set_body_string("B exploded"),
        ),
        (
            "C",
            ResponseTemplate::new(200).set_body_json(health_body("C", "Warning")),
        ),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/OperationsManager/data/monitoring/{id}")))
            .respond_with(template)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn best_effort_polling_keeps_the_survivors() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_health_states(&server).await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let states = client
        .poll_health_states(&["A".into(), "B".into(), "C".into()])
        .await
        .unwrap();

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].object_id, "A");
    assert_eq!(states[1].object_id, "C");
}

#[tokio::test]
async fn fail_fast_fetch_surfaces_the_failure() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_health_states(&server).await;

    let objects = ["A", "B", "C"]
        .iter()
        .map(|id| opsmgr_core::api::MonitoringObject {
            id: id.to_string(),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let err = client.get_health_states(&objects).await.unwrap_err();

    match err {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("B exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn counters_are_deduplicated_across_objects() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let counters = |names: &[&str]| {
        json!({
            "tableColumns": [],
            "rows": names.iter().map(|name| json!({
                "objectname": "Processor",
                "countername": name,
                "instancename": "_Total"
            })).collect::<Vec<_>>()
        })
    };

    Mock::given(method("GET"))
        .and(path("/OperationsManager/data/performanceCounters/o1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(counters(&["% Processor Time", "Interrupts/sec"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/OperationsManager/data/performanceCounters/o2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(counters(&["% Processor Time"])))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let result = client
        .get_performance_counters(&["o1".into(), "o2".into()])
        .await
        .unwrap();

    let names: Vec<&str> = result.iter().map(|c| c.counter_name.as_str()).collect();
    assert_eq!(names, vec!["% Processor Time", "Interrupts/sec"]);
}

// ============================================================================
// Typed dispatcher
// ============================================================================

#[tokio::test]
async fn empty_response_body_decodes_to_the_default() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/OperationsManager/data/state"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let state = client.get_state("g1", "c1").await.unwrap();
    assert!(state.rows.is_empty());
}

#[tokio::test]
async fn unexpected_status_preserves_the_body() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();
    let err = client.get_alerts("Severity = 2").await.unwrap_err();
    match err {
        Error::UnexpectedStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance window");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Query dispatch
// ============================================================================

fn request(ref_id: &str, query: serde_json::Value) -> QueryRequest {
    serde_json::from_value(json!({
        "refId": ref_id,
        "query": query
    }))
    .unwrap()
}

#[tokio::test]
async fn invalid_performance_query_never_reaches_the_network() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();

    let responses = client
        .run_queries(vec![request(
            "A",
            json!({"type": "performance", "instances": [{"id": "o1"}]}),
        )])
        .await;

    let response = &responses["A"];
    assert!(!response.is_ok());
    assert!(response.error.as_deref().unwrap().contains("counter"));
    assert_eq!(
        response.error_origin,
        Some(opsmgr_core::ErrorOrigin::Local)
    );

    // Only the login ever reached the server.
    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn unknown_query_type_does_not_affect_siblings() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path(ALERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_body()))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();

    let responses = client
        .run_queries(vec![
            request("A", json!({"type": "alerts", "criteria": ""})),
            request("B", json!({"type": "events"})),
        ])
        .await;

    assert!(responses["A"].is_ok());
    assert_eq!(responses["A"].frames.len(), 1);
    assert_eq!(responses["A"].frames[0].row_count(), 1);

    assert!(!responses["B"].is_ok());
    assert!(
        responses["B"]
            .error
            .as_deref()
            .unwrap()
            .contains("unknown query type")
    );
}

#[tokio::test]
async fn group_state_query_builds_a_table_frame() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/OperationsManager/data/state"))
        .and(body_json(json!({
            "classId": "c1",
            "groupId": "g1",
            "objectIds": [],
            "criteria": "",
            "displayColumns": ["healthstate", "displayname", "path", "maintenancemode"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tableColumns": [],
            "rows": [{
                "id": "o1",
                "healthstate": "Success",
                "displayname": "SQL01",
                "path": "sql01.contoso.local",
                "maintenancemode": "False"
            }]
        })))
        .mount(&server)
        .await;

    let client = OpsClient::connect(mock_settings(&server)).await.unwrap();

    let responses = client
        .run_queries(vec![request(
            "A",
            json!({
                "type": "state",
                "groups": [{"id": "g1"}],
                "classes": [{"id": "c1"}]
            }),
        )])
        .await;

    let response = &responses["A"];
    assert!(response.is_ok(), "error: {:?}", response.error);
    assert_eq!(response.frames.len(), 1);
    assert_eq!(response.frames[0].row_count(), 1);
}
