//! Integration tests for all API endpoints.
//!
//! Each test boots the full Axum router through `api::create_router` (the
//! same assembly as `main.rs`) and drives it with
//! `tower::ServiceExt::oneshot`; no live server or live holiday API needed.
//!
//! `build_test_app()` wires together:
//! - A `HolidayApiClient` pointed at a wiremock server, wrapped in the
//!   circuit breaker (retries disabled to keep failures fast)
//! - An in-memory holiday cache and SQLite employee repository
//! - Prometheus `AppMetrics`

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Local};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use holiday_alerts::{
    api::{self, AppState},
    cache::InMemoryHolidayCache,
    db,
    holidays::{
        CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSource, EmployeeHolidayLookup,
        HolidayLookupService, RetryPolicy, RetryingSource,
    },
    metrics::AppMetrics,
    repository::{EmployeeRepository, SqliteEmployeeRepository},
    services::holiday_api::HolidayApiClient,
};

// ---- Helpers ----------------------------------------------------------------

fn holidays_path(country_code: &str) -> String {
    format!("/api/v3/publicholidays/{}/{}", Local::now().year(), country_code)
}

/// Upstream payload with one holiday today and one at the end of the year.
fn upstream_holidays() -> Value {
    let today = Local::now().date_naive();
    json!([
        {
            "date": today.to_string(),
            "localName": "Heute",
            "name": "Test Day",
            "countryCode": "GB",
            "types": ["Public"]
        },
        {
            "date": format!("{}-12-31", today.year()),
            "localName": "Silvester",
            "name": "Year End",
            "countryCode": "GB",
            "types": ["Public"]
        }
    ])
}

async fn mount_holidays(server: &MockServer, country_code: &str) {
    Mock::given(method("GET"))
        .and(path(holidays_path(country_code)))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_holidays()))
        .mount(server)
        .await;
}

/// Build the complete test router against the given mock holiday API.
///
/// The `MockServer` must stay alive for the duration of the test because
/// the client holds its URL.
async fn build_test_app(server: &MockServer) -> Router {
    let client =
        HolidayApiClient::new(server.uri(), "holiday-alerts-test", Duration::from_secs(5)).unwrap();
    let source = Arc::new(CircuitBreakerSource::new(
        RetryingSource::new(client, RetryPolicy::none()),
        Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default())),
    ));
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let lookup = Arc::new(
        HolidayLookupService::new(source, Arc::new(InMemoryHolidayCache::new()))
            .with_metrics(metrics.clone()),
    );

    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    let employees: Arc<dyn EmployeeRepository + Send + Sync> =
        Arc::new(SqliteEmployeeRepository::new(pool));
    let employee_lookup = Arc::new(EmployeeHolidayLookup::new(
        employees.clone(),
        lookup.clone(),
    ));

    api::create_router(AppState {
        lookup,
        employee_lookup,
        employees,
        metrics,
    })
}

fn new_employee(email: &str, country_code: &str) -> Value {
    json!({
        "name": "Ada Lovelace",
        "position": "Engineer",
        "email": email,
        "salary": 85000.0,
        "countryCode": country_code
    })
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Convenience: collect body bytes and parse as JSON.
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(app: &Router, body: Value) -> Value {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/employees", &body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    json_body(res.into_body()).await
}

// ---- GET /health ------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;

    let res = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

// ---- GET /metrics -----------------------------------------------------------

#[tokio::test]
async fn metrics_reflect_lookups() {
    let server = MockServer::start().await;
    mount_holidays(&server, "GB").await;
    let app = build_test_app(&server).await;

    app.clone().oneshot(get("/holidays/country/GB")).await.unwrap();
    let res = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("holiday_alerts_lookups_total 1"));
    assert!(text.contains("holiday_alerts_cache_misses_total 1"));
}

// ---- GET /holidays/country/:country_code ------------------------------------

#[tokio::test]
async fn country_holidays_returns_the_full_year() {
    let server = MockServer::start().await;
    mount_holidays(&server, "GB").await;
    let app = build_test_app(&server).await;

    let res = app.oneshot(get("/holidays/country/GB")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res.into_body()).await;
    let names: Vec<&str> = body["publicHoliday"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Test Day", "Year End"]);
}

#[tokio::test]
async fn country_holidays_are_served_from_cache_on_repeat() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(holidays_path("GB")))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_holidays()))
        .expect(1)
        .mount(&server)
        .await;
    let app = build_test_app(&server).await;

    for _ in 0..3 {
        let res = app.clone().oneshot(get("/holidays/country/GB")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn upstream_failure_maps_to_503_without_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(holidays_path("US")))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace here"))
        .mount(&server)
        .await;
    let app = build_test_app(&server).await;

    let res = app.oneshot(get("/holidays/country/US")).await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(res.into_body()).await;
    assert_eq!(body["error"], "holiday service unavailable");
}

#[tokio::test]
async fn open_circuit_rejects_without_calling_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(holidays_path("US")))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    let app = build_test_app(&server).await;

    for _ in 0..5 {
        let res = app.clone().oneshot(get("/holidays/country/US")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

// ---- /employees -------------------------------------------------------------

#[tokio::test]
async fn create_then_fetch_employee() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;

    let res = app
        .clone()
        .oneshot(json_request("POST", "/employees", &new_employee("ada@example.com", "GB")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let created = json_body(res.into_body()).await;
    let id = created["employeeId"].as_str().unwrap();
    assert_ne!(id, uuid::Uuid::nil().to_string());
    assert_eq!(location, format!("/employees/{}", id));

    let res = app.oneshot(get(&location)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = json_body(res.into_body()).await;
    assert_eq!(fetched["email"], "ada@example.com");
    assert_eq!(fetched["countryCode"], "GB");
}

#[tokio::test]
async fn create_rejects_invalid_email() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;

    let res = app
        .oneshot(json_request("POST", "/employees", &new_employee("not-an-email", "GB")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_all_employees() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;
    create(&app, new_employee("a@example.com", "GB")).await;
    create(&app, new_employee("b@example.com", "US")).await;

    let res = app.oneshot(get("/employees")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res.into_body()).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_employee_is_404_and_bad_id_is_400() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;

    let res = app
        .clone()
        .oneshot(get(&format!("/employees/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get("/employees/not-a-uuid")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_replaces_fields() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;
    let created = create(&app, new_employee("ada@example.com", "GB")).await;
    let uri = format!("/employees/{}", created["employeeId"].as_str().unwrap());

    let mut changed = new_employee("ada@example.org", "US");
    changed["position"] = json!("Principal Engineer");
    let res = app
        .clone()
        .oneshot(json_request("PUT", &uri, &changed))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let fetched = json_body(app.oneshot(get(&uri)).await.unwrap().into_body()).await;
    assert_eq!(fetched["position"], "Principal Engineer");
    assert_eq!(fetched["countryCode"], "US");
    assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn update_rejects_mismatched_id_and_unknown_employee() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;
    let created = create(&app, new_employee("ada@example.com", "GB")).await;
    let uri = format!("/employees/{}", created["employeeId"].as_str().unwrap());

    let mut mismatched = new_employee("ada@example.com", "GB");
    mismatched["employeeId"] = json!(uuid::Uuid::new_v4().to_string());
    let res = app
        .clone()
        .oneshot(json_request("PUT", &uri, &mismatched))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let unknown = format!("/employees/{}", uuid::Uuid::new_v4());
    let res = app
        .oneshot(json_request("PUT", &unknown, &new_employee("x@example.com", "GB")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ---- GET /holidays/employee/:employee_id ------------------------------------

#[tokio::test]
async fn employee_holidays_cover_the_next_week_only() {
    let server = MockServer::start().await;
    mount_holidays(&server, "GB").await;
    let app = build_test_app(&server).await;
    let created = create(&app, new_employee("ada@example.com", "GB")).await;

    let uri = format!(
        "/holidays/employee/{}",
        created["employeeId"].as_str().unwrap()
    );
    let res = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res.into_body()).await;
    let holidays = body["publicHoliday"].as_array().unwrap();
    assert!(holidays.iter().any(|h| h["name"] == "Test Day"));
    assert!(holidays.len() <= 2);
}

#[tokio::test]
async fn employee_holidays_for_unknown_employee_is_404() {
    let server = MockServer::start().await;
    let app = build_test_app(&server).await;

    let uri = format!("/holidays/employee/{}", uuid::Uuid::new_v4());
    let res = app.oneshot(get(&uri)).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
