//! Employee record endpoints.
//!
//! Routes:
//! - `GET  /employees`      : list all employees
//! - `GET  /employees/:id`  : fetch one employee
//! - `POST /employees`      : create (id optional; assigned when absent)
//! - `PUT  /employees/:id`  : replace an existing employee

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::repository::Employee;

/// One `@`, a non-empty local part, and a dotted domain with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

fn validate(employee: &Employee) -> Result<(), AppError> {
    if !is_valid_email(&employee.email) {
        return Err(AppError::Validation(format!(
            "Invalid email address '{}'",
            employee.email
        )));
    }
    if employee.country_code.trim().is_empty() {
        return Err(AppError::Validation("country_code is required".to_string()));
    }
    Ok(())
}

pub async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.employees.list().await?))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(state.employees.get_by_id(employee_id).await?))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<Employee>,
) -> Result<Response, AppError> {
    validate(&body)?;

    let created = state.employees.create(body).await?;
    tracing::info!("Created employee {}", created.employee_id);

    let location = format!("/employees/{}", created.employee_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(mut body): Json<Employee>,
) -> Result<StatusCode, AppError> {
    if !body.employee_id.is_nil() && body.employee_id != employee_id {
        return Err(AppError::Validation(format!(
            "Path id {} does not match body id {}",
            employee_id, body.employee_id
        )));
    }
    body.employee_id = employee_id;
    validate(&body)?;

    state.employees.update(body).await?;
    Ok(StatusCode::NO_CONTENT)
}
