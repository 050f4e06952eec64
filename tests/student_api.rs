//! Student API Tests
//!
//! Drives the full router in-process:
//! - Create / fetch / list round trips
//! - Status mapping for bad input, missing rows and storage failures
//! - Rejected creates never touch the table

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use students_api::http_server::{HttpServer, HttpServerConfig};
use students_api::model::Student;
use students_api::storage::{
    self, DbConfig, SharedStorage, SqliteStorage, Storage, StorageError, StorageResult,
};

// =============================================================================
// Helper Functions
// =============================================================================

async fn sqlite_router() -> (Router, SharedStorage) {
    let storage: SharedStorage = Arc::new(SqliteStorage::in_memory().await.unwrap());
    (router_for(storage.clone()), storage)
}

fn router_for(storage: SharedStorage) -> Router {
    HttpServer::new(HttpServerConfig::with_address("127.0.0.1:0"), storage).router()
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Storage whose every call fails like a broken database
struct BrokenStorage;

#[async_trait]
impl Storage for BrokenStorage {
    async fn create_student(&self, _: &str, _: &str, _: i32) -> StorageResult<i64> {
        Err(StorageError::Query(sqlx::Error::Protocol("disk I/O error".to_string())))
    }

    async fn get_student_by_id(&self, _: i64) -> StorageResult<Student> {
        Err(StorageError::Query(sqlx::Error::Protocol("disk I/O error".to_string())))
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        Err(StorageError::Query(sqlx::Error::Protocol("disk I/O error".to_string())))
    }
}

/// Storage that answers only after `delay`
struct SlowStorage {
    delay: Duration,
}

#[async_trait]
impl Storage for SlowStorage {
    async fn create_student(&self, _: &str, _: &str, _: i32) -> StorageResult<i64> {
        tokio::time::sleep(self.delay).await;
        Ok(1)
    }

    async fn get_student_by_id(&self, _: i64) -> StorageResult<Student> {
        tokio::time::sleep(self.delay).await;
        Err(StorageError::NotFound(1))
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_welcome_page() {
    let (router, _) = sqlite_router().await;

    let (status, body) = send(&router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "Welcome to Students API!");
}

#[tokio::test]
async fn test_health() {
    let (router, _) = sqlite_router().await;

    let (status, body) = send_json(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

/// POST then GET by id returns the input plus the assigned id; unknown id is 404.
#[tokio::test]
async fn test_create_fetch_scenario() {
    let (router, _) = sqlite_router().await;

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/students",
        Some(r#"{"name":"Ana","email":"ana@x.com","age":21}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1}));

    let (status, body) = send_json(&router, Method::GET, "/api/students/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "name": "Ana", "email": "ana@x.com", "age": 21}));

    let (status, body) = send_json(&router, Method::GET, "/api/students/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert!(body["error"].as_str().unwrap().contains('2'));
}

#[tokio::test]
async fn test_list_empty_then_populated() {
    let (router, _) = sqlite_router().await;

    let (status, body) = send_json(&router, Method::GET, "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for (name, age) in [("Ana", 21), ("Bo", 22), ("Cy", 23)] {
        let payload = json!({"name": name, "email": format!("{name}@x.com"), "age": age});
        let (status, _) = send_json(
            &router,
            Method::POST,
            "/api/students",
            Some(&payload.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send_json(&router, Method::GET, "/api/students", None).await;
    let students: Vec<Student> = serde_json::from_value(body).unwrap();
    let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Bo", "Cy"]);
    assert!(students.windows(2).all(|w| w[0].id < w[1].id));
}

// =============================================================================
// Client Errors
// =============================================================================

/// Rejected creates answer 400 and leave the row count unchanged.
#[tokio::test]
async fn test_invalid_creates_insert_nothing() {
    let (router, storage) = sqlite_router().await;
    storage.create_student("Ana", "ana@x.com", 21).await.unwrap();
    let before = storage.get_students().await.unwrap().len();

    let bodies = [
        r#"{"email":"x@x.com","age":20}"#,
        r#"{"name":"X","age":20}"#,
        r#"{"name":"X","email":"x@x.com"}"#,
        r#"{"name":"X","email":"x@x.com","age":0}"#,
        r#"{"name":"X","email":"x@x.com","age":"twenty"}"#,
        "{not json",
        "",
    ];

    for body in bodies {
        let (status, response) =
            send_json(&router, Method::POST, "/api/students", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response["code"], 400);
    }

    assert_eq!(storage.get_students().await.unwrap().len(), before);
}

#[tokio::test]
async fn test_validation_message_names_fields() {
    let (router, _) = sqlite_router().await;

    let (_, body) = send_json(&router, Method::POST, "/api/students", Some("{}")).await;
    assert_eq!(
        body["error"],
        "field age is required, field email is required, field name is required"
    );
}

#[tokio::test]
async fn test_empty_body_message() {
    let (router, _) = sqlite_router().await;

    let (status, body) = send_json(&router, Method::POST, "/api/students", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty body");
}

#[tokio::test]
async fn test_non_integer_id_is_bad_request() {
    let (router, _) = sqlite_router().await;

    for uri in ["/api/students/abc", "/api/students/1.5", "/api/students/99999999999999999999"] {
        let (status, _) = send_json(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// Storage failures answer 500 without echoing driver details.
#[tokio::test]
async fn test_storage_failures_are_opaque_500s() {
    let router = router_for(Arc::new(BrokenStorage));

    let requests = [
        (Method::POST, "/api/students", Some(r#"{"name":"Ana","email":"a@x.com","age":21}"#)),
        (Method::GET, "/api/students/1", None),
        (Method::GET, "/api/students", None),
    ];

    for (method, uri, body) in requests {
        let (status, response) = send_json(&router, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri: {uri}");
        assert!(!response["error"].as_str().unwrap().contains("disk"));
    }
}

// =============================================================================
// Backend Selection
// =============================================================================

/// The router behaves the same whether storage came from the factory or directly.
#[tokio::test]
async fn test_factory_built_sqlite_file_backend() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("storage.db");
    let storage = storage::new(&DbConfig::sqlite(path.to_string_lossy()))
        .await
        .unwrap();
    let router = router_for(storage);

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/students",
        Some(r#"{"name":"Ana","email":"ana@x.com","age":21}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1}));
}

// =============================================================================
// Request Deadline
// =============================================================================

/// A storage call running past `request_timeout_secs` answers 408.
#[tokio::test]
async fn test_slow_storage_times_out() {
    let config = HttpServerConfig {
        request_timeout_secs: 1,
        ..HttpServerConfig::with_address("127.0.0.1:0")
    };
    let storage: SharedStorage = Arc::new(SlowStorage {
        delay: Duration::from_secs(3),
    });
    let router = HttpServer::new(config, storage).router();

    let (status, _) = send(&router, Method::GET, "/api/students", None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}
