//! Schema change calls against a mock Doris frontend
//!
//! The mock serves both frontend endpoints, records every request it sees and
//! answers with a configurable status and body.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use doris_sink::{DorisClient, DorisConnection};
use doris_types::{DorisType, SchemaChangeIntent};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Clone)]
struct MockFrontend {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    check_reply: (StatusCode, String),
    execute_reply: (StatusCode, String),
}

impl MockFrontend {
    fn replying(check: (StatusCode, Value), execute: (StatusCode, Value)) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            check_reply: (check.0, check.1.to_string()),
            execute_reply: (execute.0, execute.1.to_string()),
        }
    }

    fn ok() -> Self {
        Self::replying(
            (StatusCode::OK, json!({"msg": "success", "code": "0"})),
            (StatusCode::OK, json!({"msg": "success", "code": 0})),
        )
    }

    fn record(&self, method: &str, path: String, headers: &HeaderMap, body: String) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path,
            authorization: header("authorization"),
            content_type: header("content-type"),
            body,
        });
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn check_handler(
    State(mock): State<MockFrontend>,
    Path((db, table)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> Response {
    mock.record(
        "GET",
        format!("/api/enable_light_schema_change/{db}/{table}"),
        &headers,
        body,
    );
    let (status, body) = mock.check_reply.clone();
    (status, [("Content-Type", "application/json")], body).into_response()
}

async fn execute_handler(
    State(mock): State<MockFrontend>,
    Path(db): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    mock.record(
        "POST",
        format!("/api/query/default_cluster/{db}"),
        &headers,
        body,
    );
    let (status, body) = mock.execute_reply.clone();
    (status, [("Content-Type", "application/json")], body).into_response()
}

/// Start the mock frontend and return its `host:port`.
async fn start_mock_frontend(mock: MockFrontend) -> String {
    let app = Router::new()
        .route(
            "/api/enable_light_schema_change/:db/:table",
            get(check_handler),
        )
        .route("/api/query/default_cluster/:db", post(execute_handler))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

fn client_for(host: String) -> DorisClient {
    DorisClient::new(
        DorisConnection::new(vec![host], "root", "secret")
            .with_request_timeout(Duration::from_secs(5)),
    )
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init();
}

#[tokio::test]
async fn test_check_sends_params_and_auth() {
    init_tracing();
    let mock = MockFrontend::ok();
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let params = DorisClient::build_request_params(&SchemaChangeIntent::drop("c1"));
    assert!(client.check_schema_change("db", "tbl", &params).await);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/api/enable_light_schema_change/db/tbl");
    assert_eq!(
        request.authorization.as_deref(),
        Some("Basic cm9vdDpzZWNyZXQ=")
    );
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({"isDropColumn": true, "columnName": "c1"}));
}

#[tokio::test]
async fn test_execute_posts_statement() {
    init_tracing();
    let mock = MockFrontend::ok();
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let statement = "ALTER TABLE db.tbl ADD COLUMN c1 INT DEFAULT '1'";
    assert!(client.execute_schema_change("db", statement).await);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/query/default_cluster/db");
    let body: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, json!({"stmt": statement}));
}

#[tokio::test]
async fn test_non_zero_code_is_failure() {
    init_tracing();
    let mock = MockFrontend::replying(
        (StatusCode::OK, json!({"msg": "not supported", "code": 1})),
        (StatusCode::OK, json!({"msg": "error", "code": "403"})),
    );
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let params = DorisClient::build_request_params(&SchemaChangeIntent::drop("c1"));
    assert!(!client.check_schema_change("db", "tbl", &params).await);
    assert!(
        !client
            .execute_schema_change("db", "ALTER TABLE db.tbl DROP COLUMN c1")
            .await
    );
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_server_error_is_failure() {
    init_tracing();
    let mock = MockFrontend::replying(
        (StatusCode::INTERNAL_SERVER_ERROR, json!({"code": "0"})),
        (StatusCode::INTERNAL_SERVER_ERROR, json!({"code": "0"})),
    );
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let params = DorisClient::build_request_params(&SchemaChangeIntent::drop("c1"));
    assert!(!client.check_schema_change("db", "tbl", &params).await);
}

#[tokio::test]
async fn test_incomplete_params_send_no_request() {
    init_tracing();
    let mock = MockFrontend::ok();
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let params = DorisClient::build_request_params(&SchemaChangeIntent::drop(""));
    assert!(!client.check_schema_change("db", "tbl", &params).await);

    let mut without_drop_flag = Map::new();
    without_drop_flag.insert("columnName".to_string(), json!("c1"));
    assert!(
        !client
            .check_schema_change("db", "tbl", &without_drop_flag)
            .await
    );

    let mut mistyped = Map::new();
    mistyped.insert("isDropColumn".to_string(), json!("true"));
    mistyped.insert("columnName".to_string(), json!("c1"));
    assert!(!client.check_schema_change("db", "tbl", &mistyped).await);

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_unreachable_frontend_is_failure() {
    init_tracing();
    let client = DorisClient::new(
        DorisConnection::new(vec!["127.0.0.1:1".to_string()], "root", "")
            .with_request_timeout(Duration::from_secs(2)),
    );

    let params = DorisClient::build_request_params(&SchemaChangeIntent::drop("c1"));
    assert!(!client.check_schema_change("db", "tbl", &params).await);
    assert!(
        !client
            .execute_schema_change("db", "ALTER TABLE db.tbl DROP COLUMN c1")
            .await
    );
}

#[tokio::test]
async fn test_apply_runs_check_then_execute() {
    init_tracing();
    let mock = MockFrontend::ok();
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let intent = SchemaChangeIntent::add("note", DorisType::VarChar { length: 60 });
    let statement = "ALTER TABLE db.tbl ADD COLUMN note VARCHAR(60)";
    assert!(client.apply("db", "tbl", &intent, statement).await);

    let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/api/enable_light_schema_change/db/tbl".to_string(),
            "/api/query/default_cluster/db".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_apply_stops_after_rejected_check() {
    init_tracing();
    let mock = MockFrontend::replying(
        (StatusCode::OK, json!({"code": "1"})),
        (StatusCode::OK, json!({"code": "0"})),
    );
    let host = start_mock_frontend(mock.clone()).await;
    let client = client_for(host);

    let intent = SchemaChangeIntent::drop("c1");
    assert!(
        !client
            .apply("db", "tbl", &intent, "ALTER TABLE db.tbl DROP COLUMN c1")
            .await
    );
    assert_eq!(mock.requests().len(), 1);
}
