use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use mini_projects_backend::config::AppConfig;
use mini_projects_backend::storage::MemoryStorage;
use mini_projects_backend::{create_router, initialize_backend_with_storage};

struct TestApp {
    router: Router,
    storage: MemoryStorage,
}

struct TestResponse {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    fn new() -> Self {
        let storage = MemoryStorage::new();
        let state = initialize_backend_with_storage(AppConfig::default(), Arc::new(storage.clone()));
        Self {
            router: create_router(state),
            storage,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    async fn send_raw(&self, method: Method, uri: &str, body: String) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        TestResponse { status, headers, body }
    }

    async fn create_account(&self, name: &str, balance: f64) -> Value {
        let response = self
            .send(
                Method::POST,
                "/api/bank/accounts",
                Some(json!({ "name": name, "age": 25, "phone": "555-0199", "balance": balance })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()
    }
}

#[tokio::test]
async fn test_initial_state() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/api/state", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["profileComplete"], false);
    assert_eq!(body["appSettings"]["theme"], "dark");
    assert_eq!(body["bankSystemData"]["accountCounter"], 1);
    assert_eq!(body["gradeSystemData"]["subjects"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_profile_and_settings_updates() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::PUT,
            "/api/student-info",
            Some(json!({ "name": "Ada", "rollNumber": "CS-01", "college": "Analytical College" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["rollNumber"], "CS-01");

    let response = app
        .send(Method::PUT, "/api/settings", Some(json!({ "soundEffects": true })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["soundEffects"], true);

    let state = app.send(Method::GET, "/api/state", None).await.json();
    assert_eq!(state["profileComplete"], true);
    assert_eq!(state["studentInfo"]["name"], "Ada");
    assert_eq!(state["appSettings"]["language"], "en");
}

#[tokio::test]
async fn test_calculator_flow() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/api/calculator/evaluate",
            Some(json!({ "first": 6.0, "second": 7.0, "operator": "×" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["result"], 42.0);
    assert_eq!(body["entry"]["expression"], "6 * 7");

    let response = app
        .send(
            Method::POST,
            "/api/calculator/evaluate",
            Some(json!({ "first": 1.0, "second": 0.0, "operator": "/" })),
        )
        .await;
    assert_eq!(response.json()["result"], 0.0);

    let response = app
        .send(Method::PUT, "/api/calculator/memory", Some(json!({ "value": 3.5 })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["memory"], 3.5);

    let calculator = app.send(Method::GET, "/api/calculator", None).await.json();
    assert_eq!(calculator["history"].as_array().unwrap().len(), 2);
    assert_eq!(calculator["lastResult"], 0.0);

    let response = app.send(Method::DELETE, "/api/calculator/history", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let calculator = app.send(Method::GET, "/api/calculator", None).await.json();
    assert!(calculator["history"].as_array().unwrap().is_empty());
    assert_eq!(calculator["memory"], 3.5);
}

#[tokio::test]
async fn test_unknown_operator_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/api/calculator/evaluate",
            Some(json!({ "first": 1.0, "second": 2.0, "operator": "%" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Unknown operator"));
}

#[tokio::test]
async fn test_history_endpoint_keeps_fifty_entries() {
    let app = TestApp::new();
    for n in 0..55 {
        let response = app
            .send(
                Method::POST,
                "/api/calculator/history",
                Some(json!({
                    "expression": format!("{} + 0", n),
                    "result": n,
                    "timestamp": "2024-01-01T00:00:00.000Z"
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let calculator = app.send(Method::GET, "/api/calculator", None).await.json();
    let history = calculator["history"].as_array().unwrap();
    assert_eq!(history.len(), 50);
    assert_eq!(history[0]["expression"], "5 + 0");
    assert_eq!(history[49]["expression"], "54 + 0");
}

#[tokio::test]
async fn test_grade_flow() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/api/grades/preview", Some(json!({ "marks": [59, 0, 0, 0, 0] })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let preview = response.json();
    assert_eq!(preview["average"], 11.8);
    assert_eq!(preview["grade"], "F");

    let response = app
        .send(
            Method::POST,
            "/api/grades/students",
            Some(json!({ "name": "Bob", "marks": [85, 85, 85, 85, 85] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let student = response.json()["student"].clone();
    assert_eq!(student["grade"], "B");
    assert_eq!(student["total"], 425);
    let id = student["id"].as_u64().unwrap();

    let response = app
        .send(
            Method::PUT,
            &format!("/api/grades/students/{}", id),
            Some(json!({ "marks": [100, 100, 100, 100, 100] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["student"]["grade"], "A");

    let grades = app.send(Method::GET, "/api/grades", None).await.json();
    assert_eq!(grades["stats"]["totalStudents"], 1);
    assert_eq!(grades["stats"]["passRate"], 100);
    assert_eq!(grades["gradingScale"]["C"]["description"], "Average");

    let response = app
        .send(Method::DELETE, &format!("/api/grades/students/{}", id), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .send(Method::DELETE, &format!("/api/grades/students/{}", id), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_out_of_range_marks_are_rejected() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/api/grades/students",
            Some(json!({ "name": "Eve", "marks": [100, 100, 150, 100, 100] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let grades = app.send(Method::GET, "/api/grades", None).await.json();
    assert!(grades["students"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_student_is_not_found() {
    let app = TestApp::new();
    let response = app
        .send(Method::PUT, "/api/grades/students/12345", Some(json!({ "name": "Ghost" })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bank_flow() {
    let app = TestApp::new();

    let created = app.create_account("Alice", 100.0).await;
    assert_eq!(created["account"]["id"], "ACC001");
    assert_eq!(created["account"]["transactions"][0]["type"], "Initial Deposit");
    let second = app.create_account("Bob", 20.0).await;
    assert_eq!(second["account"]["id"], "ACC002");

    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC001/deposit", Some(json!({ "amount": 50.0 })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let account = response.json()["account"].clone();
    assert_eq!(account["balance"], 150.0);
    let last = account["transactions"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["type"], "Deposit");
    assert_eq!(last["amount"], 50.0);
    assert_eq!(last["balance"], 150.0);

    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC002/withdraw", Some(json!({ "amount": 5.0 })))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["successMessage"].as_str().unwrap().contains("$15.00"));

    let bank = app.send(Method::GET, "/api/bank", None).await.json();
    assert_eq!(bank["totalBalance"], 165.0);
    assert_eq!(bank["stats"]["highest"], 150.0);
    assert_eq!(bank["stats"]["lowest"], 15.0);
    assert_eq!(bank["accountCounter"], 3);
}

#[tokio::test]
async fn test_overdraft_is_conflict() {
    let app = TestApp::new();
    app.create_account("Alice", 10.0).await;

    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC001/withdraw", Some(json!({ "amount": 25.0 })))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(response.text().contains("Insufficient funds"));

    let bank = app.send(Method::GET, "/api/bank", None).await.json();
    assert_eq!(bank["accounts"][0]["balance"], 10.0);
    assert_eq!(bank["accounts"][0]["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_custom_transaction_and_invalid_amount() {
    let app = TestApp::new();
    app.create_account("Alice", 10.0).await;

    let response = app
        .send(
            Method::POST,
            "/api/bank/accounts/ACC001/transactions",
            Some(json!({ "amount": 2.5, "type": "Interest" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let last = response.json()["account"]["transactions"][1].clone();
    assert_eq!(last["type"], "Interest");
    assert_eq!(last["description"], "Interest");

    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC001/deposit", Some(json!({ "amount": 0.0 })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_account_is_not_found_and_changes_nothing() {
    let app = TestApp::new();
    app.create_account("Alice", 100.0).await;

    let response = app.send(Method::DELETE, "/api/bank/accounts/ACC404", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC404/deposit", Some(json!({ "amount": 1.0 })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let bank = app.send(Method::GET, "/api/bank", None).await.json();
    assert_eq!(bank["accounts"].as_array().unwrap().len(), 1);
    assert_eq!(bank["totalBalance"], 100.0);
}

#[tokio::test]
async fn test_deleted_account_id_is_not_reused() {
    let app = TestApp::new();
    app.create_account("Alice", 1.0).await;

    let response = app.send(Method::DELETE, "/api/bank/accounts/ACC001", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["account"]["id"], "ACC001");

    let created = app.create_account("Bob", 1.0).await;
    assert_eq!(created["account"]["id"], "ACC002");
}

#[tokio::test]
async fn test_export_then_import_into_fresh_app() {
    let source = TestApp::new();
    source.create_account("Alice", 100.0).await;
    source
        .send(
            Method::POST,
            "/api/grades/students",
            Some(json!({ "name": "Bob", "marks": [70, 75, 80, 85, 90] })),
        )
        .await;
    source
        .send(
            Method::POST,
            "/api/calculator/evaluate",
            Some(json!({ "first": 2.0, "second": 3.0, "operator": "+" })),
        )
        .await;

    let export = source.send(Method::GET, "/api/data/export", None).await;
    assert_eq!(export.status, StatusCode::OK);
    let disposition = export.headers[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"futuristic-projects-backup-"));
    assert!(disposition.ends_with(".json\""));

    let target = TestApp::new();
    let response = target.send_raw(Method::POST, "/api/data/import", export.text()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["importedSections"],
        json!(["calculatorData", "gradeSystemData", "bankSystemData"])
    );

    let before = source.send(Method::GET, "/api/state", None).await.json();
    let after = target.send(Method::GET, "/api/state", None).await.json();
    for section in ["calculatorData", "gradeSystemData", "bankSystemData"] {
        assert_eq!(before[section], after[section], "section {} differs", section);
    }
}

#[tokio::test]
async fn test_malformed_import_is_rejected() {
    let app = TestApp::new();
    app.create_account("Alice", 100.0).await;

    let response = app
        .send_raw(Method::POST, "/api/data/import", "{ definitely not json".to_string())
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .send(Method::POST, "/api/data/import", Some(json!({ "unrelated": true })))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .send(
            Method::POST,
            "/api/data/import",
            Some(json!({ "bankSystemData": { "accounts": "nope", "totalBalance": 0, "accountCounter": 1 } })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let bank = app.send(Method::GET, "/api/bank", None).await.json();
    assert_eq!(bank["accounts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_keeps_profile() {
    let app = TestApp::new();
    app.send(Method::PUT, "/api/student-info", Some(json!({ "name": "Ada" })))
        .await;
    app.create_account("Alice", 100.0).await;

    let response = app.send(Method::POST, "/api/data/reset", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let state = app.send(Method::GET, "/api/state", None).await.json();
    assert_eq!(state["studentInfo"]["name"], "Ada");
    assert!(state["bankSystemData"]["accounts"].as_array().unwrap().is_empty());
    assert_eq!(state["bankSystemData"]["accountCounter"], 1);
    assert_eq!(state["bankSystemData"]["totalBalance"], 0.0);

    let created = app.create_account("Bob", 5.0).await;
    assert_eq!(created["account"]["id"], "ACC001");
}

#[tokio::test]
async fn test_persistence_failure_is_server_error() {
    let app = TestApp::new();
    app.create_account("Alice", 100.0).await;

    app.storage.set_failing(true);
    let response = app
        .send(Method::POST, "/api/bank/accounts/ACC001/deposit", Some(json!({ "amount": 10.0 })))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let bank = app.send(Method::GET, "/api/bank", None).await.json();
    assert_eq!(bank["accounts"][0]["balance"], 100.0);
}

#[tokio::test]
async fn test_log_forwarding() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/api/logs",
            Some(json!({ "level": "warn", "message": "hello", "component": "ui" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["success"], true);
}
