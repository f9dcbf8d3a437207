//! Integration tests for sampling through the statement protocol.
//!
//! A local axum server plays the coordinator and serves canned
//! `QueryResults` pages.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use colscout::config::{ConnectionConfig, HttpScheme};
use colscout::engine::{EngineClient, EngineError};
use colscout::metadata::{EngineSampler, TableSampler};
use serde_json::{json, Value};

// ============================================================================
// Fake coordinator
// ============================================================================

#[derive(Default)]
struct Scenario {
    pages: Vec<Value>,
    busy_submits: usize,
    reject_auth: bool,
}

struct Coordinator {
    base: String,
    pages: Vec<Value>,
    busy_submits: AtomicUsize,
    reject_auth: bool,
    statements: Mutex<Vec<String>>,
    submit_headers: Mutex<Option<HeaderMap>>,
    fetched: Mutex<Vec<usize>>,
    cancelled: Mutex<Vec<usize>>,
}

impl Coordinator {
    /// Page `index`, pointing at the next one unless it is the last.
    fn page(&self, index: usize) -> Value {
        let mut page = self
            .pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!({ "id": "q1" }));
        if index + 1 < self.pages.len() {
            page["nextUri"] = json!(format!(
                "{}/v1/statement/executing/q1/{}",
                self.base,
                index + 1
            ));
        }
        page
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn fetched(&self) -> Vec<usize> {
        self.fetched.lock().unwrap().clone()
    }

    fn cancelled(&self) -> Vec<usize> {
        self.cancelled.lock().unwrap().clone()
    }

    fn submit_header(&self, name: &str) -> Option<String> {
        self.submit_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|headers| headers.get(name))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

async fn submit(
    State(coordinator): State<Arc<Coordinator>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if coordinator.reject_auth {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let busy = coordinator
        .busy_submits
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if busy {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    coordinator.statements.lock().unwrap().push(body);
    *coordinator.submit_headers.lock().unwrap() = Some(headers);
    Json(coordinator.page(0)).into_response()
}

async fn fetch(
    State(coordinator): State<Arc<Coordinator>>,
    Path((_id, index)): Path<(String, usize)>,
) -> Json<Value> {
    coordinator.fetched.lock().unwrap().push(index);
    Json(coordinator.page(index))
}

async fn cancel(
    State(coordinator): State<Arc<Coordinator>>,
    Path((_id, index)): Path<(String, usize)>,
) -> StatusCode {
    coordinator.cancelled.lock().unwrap().push(index);
    StatusCode::NO_CONTENT
}

async fn start(scenario: Scenario) -> (Arc<Coordinator>, EngineSampler) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let coordinator = Arc::new(Coordinator {
        base: format!("http://{}", addr),
        pages: scenario.pages,
        busy_submits: AtomicUsize::new(scenario.busy_submits),
        reject_auth: scenario.reject_auth,
        statements: Mutex::default(),
        submit_headers: Mutex::default(),
        fetched: Mutex::default(),
        cancelled: Mutex::default(),
    });

    let app = Router::new()
        .route("/v1/statement", post(submit))
        .route(
            "/v1/statement/executing/{id}/{index}",
            get(fetch).delete(cancel),
        )
        .with_state(coordinator.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ConnectionConfig {
        host: "127.0.0.1".to_string(),
        port: addr.port(),
        user: "qa".to_string(),
        password: "secret".to_string(),
        scheme: HttpScheme::Http,
        catalog: "hive".to_string(),
        verify_tls: true,
    };
    let client = EngineClient::with_timeout(config, Duration::from_secs(5)).unwrap();
    (coordinator, EngineSampler::new(client))
}

fn columns(names: &[(&str, &str)]) -> Value {
    names
        .iter()
        .map(|(name, type_name)| json!({ "name": name, "type": type_name }))
        .collect()
}

fn orders_columns() -> Value {
    columns(&[
        ("order_id", "bigint"),
        ("revenue", "double"),
        ("order_date_local", "date"),
        ("etl_ts", "timestamp(3)"),
    ])
}

fn queued() -> Value {
    json!({ "id": "q1", "stats": { "state": "QUEUED" } })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_pages_are_followed_in_order() {
    let (coordinator, sampler) = start(Scenario {
        pages: vec![
            queued(),
            json!({ "id": "q1", "columns": orders_columns(), "stats": { "state": "RUNNING" } }),
            json!({
                "id": "q1",
                "columns": orders_columns(),
                "data": [[1, 100.5, "2024-01-01", null]],
                "stats": { "state": "FINISHED" }
            }),
        ],
        ..Default::default()
    })
    .await;

    let info = sampler.sample("orders").await.unwrap();

    assert_eq!(info.table_name, "orders");
    assert_eq!(
        info.columns,
        vec!["order_id", "revenue", "order_date_local", "etl_ts"]
    );
    assert_eq!(
        info.sample_data,
        vec![
            Some("1".to_string()),
            Some("100.5".to_string()),
            Some("2024-01-01".to_string()),
            None
        ]
    );

    assert_eq!(coordinator.statements(), vec!["SELECT * FROM orders LIMIT 1"]);
    assert_eq!(coordinator.fetched(), vec![1, 2]);
    assert!(coordinator.cancelled().is_empty());

    assert_eq!(coordinator.submit_header("x-trino-user").as_deref(), Some("qa"));
    assert_eq!(coordinator.submit_header("x-trino-catalog").as_deref(), Some("hive"));
    assert_eq!(coordinator.submit_header("x-trino-source").as_deref(), Some("colscout"));
    assert!(coordinator
        .submit_header("authorization")
        .is_some_and(|auth| auth.starts_with("Basic ")));
}

#[tokio::test]
async fn test_error_page_is_query_error_and_cancels() {
    let (coordinator, sampler) = start(Scenario {
        pages: vec![
            queued(),
            json!({
                "id": "q1",
                "error": {
                    "message": "line 1:15: Table 'hive.dw.nope' does not exist",
                    "errorCode": 46,
                    "errorName": "TABLE_NOT_FOUND",
                    "errorType": "USER_ERROR"
                }
            }),
            json!({ "id": "q1" }),
        ],
        ..Default::default()
    })
    .await;

    let err = sampler.sample("dw.nope").await.unwrap_err();

    match &err {
        EngineError::Query { name, message } => {
            assert_eq!(name, "TABLE_NOT_FOUND");
            assert!(message.contains("does not exist"));
        }
        other => panic!("expected query error, got {:?}", other),
    }
    assert!(!err.is_connection());
    assert_eq!(coordinator.fetched(), vec![1]);
    assert_eq!(coordinator.cancelled(), vec![2]);
}

#[tokio::test]
async fn test_empty_table_gives_null_samples() {
    let (_coordinator, sampler) = start(Scenario {
        pages: vec![
            queued(),
            json!({
                "id": "q1",
                "columns": columns(&[("event_id", "bigint"), ("event_date_local", "date")]),
                "stats": { "state": "FINISHED" }
            }),
        ],
        ..Default::default()
    })
    .await;

    let info = sampler.sample("events").await.unwrap();

    assert_eq!(info.columns, vec!["event_id", "event_date_local"]);
    assert_eq!(info.sample_data, vec![None, None]);
}

#[tokio::test]
async fn test_row_width_mismatch_is_protocol_error() {
    let (_coordinator, sampler) = start(Scenario {
        pages: vec![json!({
            "id": "q1",
            "columns": columns(&[("a", "bigint"), ("b", "varchar")]),
            "data": [[1]],
            "stats": { "state": "FINISHED" }
        })],
        ..Default::default()
    })
    .await;

    let err = sampler.sample("t").await.unwrap_err();
    assert!(matches!(err, EngineError::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn test_finished_without_columns_is_protocol_error() {
    let (_coordinator, sampler) = start(Scenario {
        pages: vec![queued(), json!({ "id": "q1", "stats": { "state": "FINISHED" } })],
        ..Default::default()
    })
    .await;

    let err = sampler.sample("t").await.unwrap_err();
    assert!(matches!(err, EngineError::Protocol(_)), "{:?}", err);
}

#[tokio::test]
async fn test_invalid_identifier_is_never_submitted() {
    let (coordinator, sampler) = start(Scenario::default()).await;

    let err = sampler.sample("orders; DROP TABLE orders").await.unwrap_err();

    assert!(matches!(err, EngineError::InvalidIdentifier(_)));
    assert!(coordinator.statements().is_empty());
}

#[tokio::test]
async fn test_busy_coordinator_is_retried() {
    let (coordinator, sampler) = start(Scenario {
        pages: vec![json!({
            "id": "q1",
            "columns": columns(&[("id", "bigint")]),
            "data": [[7]],
        })],
        busy_submits: 2,
        ..Default::default()
    })
    .await;

    let info = sampler.sample("t").await.unwrap();

    assert_eq!(info.sample_data, vec![Some("7".to_string())]);
    assert_eq!(coordinator.statements().len(), 1);
}

#[tokio::test]
async fn test_rejected_credentials_are_connection_error() {
    let (_coordinator, sampler) = start(Scenario {
        reject_auth: true,
        ..Default::default()
    })
    .await;

    let err = sampler.sample("orders").await.unwrap_err();
    assert!(err.is_connection(), "{:?}", err);
}
