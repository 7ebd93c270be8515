//! Holiday lookup endpoints.
//!
//! Routes:
//! - `GET /holidays/country/:country_code`: current year's holidays
//! - `GET /holidays/employee/:employee_id`: next 7 days for the employee's country

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::holidays::Holiday;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayListResponse {
    pub public_holiday: Vec<Holiday>,
}

pub async fn country_holidays(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
) -> Result<Json<HolidayListResponse>, AppError> {
    let year = Local::now().year();
    let public_holiday = state.lookup.get_holidays(&country_code, year).await?;

    Ok(Json(HolidayListResponse { public_holiday }))
}

pub async fn employee_holidays(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<HolidayListResponse>, AppError> {
    let public_holiday = state
        .employee_lookup
        .get_upcoming_for_employee(employee_id)
        .await?;

    Ok(Json(HolidayListResponse { public_holiday }))
}
