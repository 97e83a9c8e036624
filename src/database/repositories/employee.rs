use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Employee, EmployeeInput, EmployeeStatus};

const EMPLOYEE_COLUMNS: &str = "id, employee_code, first_name, last_name, department, salary, status, created_at, updated_at";

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: EmployeeInput) -> Result<Employee> {
        let now = Utc::now();
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (id, employee_code, first_name, last_name, department, salary, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(input.employee_code)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.department)
        .bind(input.salary)
        .bind(input.status.unwrap_or_default())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list_active(&self) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE status = ? ORDER BY last_name, first_name"
        ))
        .bind(EmployeeStatus::Active)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }
}
