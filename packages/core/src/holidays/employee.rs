//! Upcoming holidays for a single employee.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::holidays::{error::HolidayError, lookup::HolidayLookupService, types::Holiday};
use crate::repository::EmployeeRepository;

/// Resolves an employee's country, then delegates to the lookup service
/// and the 7-day window.
pub struct EmployeeHolidayLookup {
    employees: Arc<dyn EmployeeRepository + Send + Sync>,
    lookup: Arc<HolidayLookupService>,
}

impl EmployeeHolidayLookup {
    pub fn new(
        employees: Arc<dyn EmployeeRepository + Send + Sync>,
        lookup: Arc<HolidayLookupService>,
    ) -> Self {
        Self { employees, lookup }
    }

    /// Holidays in the employee's country over the next 7 days, starting
    /// from today's local date.
    pub async fn get_upcoming_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<Holiday>, HolidayError> {
        self.get_upcoming_for_employee_on(employee_id, Local::now().date_naive())
            .await
    }

    pub async fn get_upcoming_for_employee_on(
        &self,
        employee_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<Holiday>, HolidayError> {
        let employee = self.employees.get_by_id(employee_id).await?;
        self.lookup.get_upcoming(&employee.country_code, today).await
    }
}
