//! Employee record store.
//!
//! The holiday core only ever reads an employee's country code, through
//! [`EmployeeRepository::get_by_id`]. The rest of the CRUD surface backs
//! the `/employees` routes. [`SqliteEmployeeRepository`] keeps ids and
//! timestamps as TEXT (UUID and RFC 3339 strings).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::holidays::error::HolidayError;

/// Serialized in camelCase (`employeeId`, `countryCode`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Nil on create requests; a fresh id is assigned.
    #[serde(default)]
    pub employee_id: Uuid,
    pub name: String,
    pub position: String,
    pub email: String,
    pub salary: f64,
    pub country_code: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Employee with this ID does not exist: {0}")]
    NotFound(Uuid),

    #[error("Employee with this ID already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Corrupt employee row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for HolidayError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => HolidayError::not_found("employee", id),
            other => HolidayError::storage(other.to_string()),
        }
    }
}

#[async_trait]
pub trait EmployeeRepository {
    /// Insert a new employee, stamping both timestamps with the current
    /// UTC time.
    async fn create(&self, employee: Employee) -> Result<Employee, RepositoryError>;

    async fn get_by_id(&self, employee_id: Uuid) -> Result<Employee, RepositoryError>;

    /// Replace every field but `created_at`; `modified_at` is restamped.
    async fn update(&self, employee: Employee) -> Result<Employee, RepositoryError>;

    async fn list(&self) -> Result<Vec<Employee>, RepositoryError>;
}

pub struct SqliteEmployeeRepository {
    pool: SqlitePool,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, employee_id: Uuid) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM employees WHERE employee_id = ?")
            .bind(employee_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| RepositoryError::CorruptRow(format!("timestamp '{}': {}", raw, err)))
}

fn employee_from_row(row: &SqliteRow) -> Result<Employee, RepositoryError> {
    let employee_id: String = row.try_get("employee_id")?;
    let created_at: String = row.try_get("created_at")?;
    let modified_at: String = row.try_get("modified_at")?;

    Ok(Employee {
        employee_id: Uuid::parse_str(&employee_id).map_err(|err| {
            RepositoryError::CorruptRow(format!("employee_id '{}': {}", employee_id, err))
        })?,
        name: row.try_get("name")?,
        position: row.try_get("position")?,
        email: row.try_get("email")?,
        salary: row.try_get("salary")?,
        country_code: row.try_get("country_code")?,
        created_at: parse_timestamp(&created_at)?,
        modified_at: parse_timestamp(&modified_at)?,
    })
}

const SELECT_COLUMNS: &str = "SELECT employee_id, name, position, email, salary, country_code, created_at, modified_at
     FROM employees";

#[async_trait]
impl EmployeeRepository for SqliteEmployeeRepository {
    async fn create(&self, mut employee: Employee) -> Result<Employee, RepositoryError> {
        if employee.employee_id.is_nil() {
            employee.employee_id = Uuid::new_v4();
        } else if self.exists(employee.employee_id).await? {
            return Err(RepositoryError::AlreadyExists(employee.employee_id));
        }

        let now = Utc::now();
        employee.created_at = now;
        employee.modified_at = now;

        sqlx::query(
            "INSERT INTO employees
             (employee_id, name, position, email, salary, country_code, created_at, modified_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(employee.employee_id.to_string())
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(&employee.email)
        .bind(employee.salary)
        .bind(&employee.country_code)
        .bind(employee.created_at.to_rfc3339())
        .bind(employee.modified_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn get_by_id(&self, employee_id: Uuid) -> Result<Employee, RepositoryError> {
        let sql = format!("{} WHERE employee_id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(employee_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound(employee_id))?;

        employee_from_row(&row)
    }

    async fn update(&self, mut employee: Employee) -> Result<Employee, RepositoryError> {
        let existing = self.get_by_id(employee.employee_id).await?;
        employee.created_at = existing.created_at;
        employee.modified_at = Utc::now();

        sqlx::query(
            "UPDATE employees
             SET name = ?, position = ?, email = ?, salary = ?, country_code = ?, modified_at = ?
             WHERE employee_id = ?",
        )
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(&employee.email)
        .bind(employee.salary)
        .bind(&employee.country_code)
        .bind(employee.modified_at.to_rfc3339())
        .bind(employee.employee_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn list(&self) -> Result<Vec<Employee>, RepositoryError> {
        let sql = format!("{} ORDER BY created_at ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(employee_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::create_pool;

    async fn make_repo() -> SqliteEmployeeRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        SqliteEmployeeRepository::new(pool)
    }

    fn make_employee(name: &str, country_code: &str) -> Employee {
        Employee {
            employee_id: Uuid::nil(),
            name: name.to_string(),
            position: "Software Engineer".to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            salary: 60000.0,
            country_code: country_code.to_string(),
            created_at: DateTime::<Utc>::default(),
            modified_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn employee_json_uses_camel_case_keys() {
        let json = serde_json::to_value(make_employee("Jane Roe", "GB")).unwrap();

        assert_eq!(json["countryCode"], "GB");
        assert!(json.get("employeeId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("country_code").is_none());

        let parsed: Employee = serde_json::from_value(serde_json::json!({
            "name": "Jane Roe",
            "position": "Analyst",
            "email": "jane@example.com",
            "salary": 50000.0,
            "countryCode": "DE"
        }))
        .unwrap();
        assert!(parsed.employee_id.is_nil());
        assert_eq!(parsed.country_code, "DE");
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let repo = make_repo().await;

        let created = repo.create(make_employee("John Doe", "US")).await.unwrap();

        assert!(!created.employee_id.is_nil());
        assert_eq!(created.name, "John Doe");
        assert_ne!(created.created_at, DateTime::<Utc>::default());
        assert_eq!(created.created_at, created.modified_at);
    }

    #[tokio::test]
    async fn create_keeps_caller_supplied_id() {
        let repo = make_repo().await;
        let id = Uuid::new_v4();
        let mut employee = make_employee("Jane Doe", "GB");
        employee.employee_id = id;

        let created = repo.create(employee).await.unwrap();

        assert_eq!(created.employee_id, id);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let repo = make_repo().await;
        let mut employee = make_employee("Jane Doe", "US");
        employee.employee_id = Uuid::new_v4();
        repo.create(employee.clone()).await.unwrap();

        let err = repo.create(employee.clone()).await.unwrap_err();

        assert!(matches!(err, RepositoryError::AlreadyExists(id) if id == employee.employee_id));
    }

    #[tokio::test]
    async fn get_by_id_round_trips_all_fields() {
        let repo = make_repo().await;
        let created = repo.create(make_employee("John Doe", "US")).await.unwrap();

        let fetched = repo.get_by_id(created.employee_id).await.unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_by_id_missing_returns_not_found() {
        let repo = make_repo().await;
        let id = Uuid::new_v4();

        let err = repo.get_by_id(id).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_created_at() {
        let repo = make_repo().await;
        let created = repo.create(make_employee("John Doe", "US")).await.unwrap();

        let mut changed = created.clone();
        changed.name = "John Smith".to_string();
        changed.position = "Senior Software Engineer".to_string();
        changed.created_at = DateTime::<Utc>::default();
        repo.update(changed).await.unwrap();

        let fetched = repo.get_by_id(created.employee_id).await.unwrap();
        assert_eq!(fetched.name, "John Smith");
        assert_eq!(fetched.position, "Senior Software Engineer");
        assert_eq!(fetched.email, "john.doe@example.com");
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.modified_at >= created.modified_at);
    }

    #[tokio::test]
    async fn update_missing_returns_not_found() {
        let repo = make_repo().await;
        let mut employee = make_employee("Non Existent", "US");
        employee.employee_id = Uuid::new_v4();

        let err = repo.update(employee).await.unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_returns_all_employees() {
        let repo = make_repo().await;
        repo.create(make_employee("John Doe", "US")).await.unwrap();
        repo.create(make_employee("Jane Doe", "GB")).await.unwrap();

        let all = repo.list().await.unwrap();

        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|e| e.name == "John Doe"));
        assert!(all.iter().any(|e| e.name == "Jane Doe"));
    }

    #[test]
    fn not_found_maps_to_holiday_not_found() {
        let id = Uuid::new_v4();
        let err: HolidayError = RepositoryError::NotFound(id).into();
        assert_eq!(err, HolidayError::not_found("employee", id));
    }
}
