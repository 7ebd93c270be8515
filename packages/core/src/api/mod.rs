//! HTTP surface: holiday lookups, employee records, health and metrics.

pub mod employees;
pub mod health;
pub mod holidays;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::error::AppError;
use crate::holidays::{EmployeeHolidayLookup, HolidayLookupService};
use crate::metrics::AppMetrics;
use crate::repository::EmployeeRepository;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<HolidayLookupService>,
    pub employee_lookup: Arc<EmployeeHolidayLookup>,
    pub employees: Arc<dyn EmployeeRepository + Send + Sync>,
    pub metrics: Arc<AppMetrics>,
}

/// Assemble the full router. `main.rs` and the integration tests both go
/// through here.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(metrics))
        .route(
            "/holidays/country/:country_code",
            get(holidays::country_holidays),
        )
        .route(
            "/holidays/employee/:employee_id",
            get(holidays::employee_holidays),
        )
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/:employee_id",
            get(employees::get_employee).put(employees::update_employee),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /metrics`: Prometheus text exposition.
async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state
        .metrics
        .render()
        .map_err(|err| AppError::Unknown(format!("metrics render failed: {}", err)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
