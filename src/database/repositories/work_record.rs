use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::database::models::{WorkRecord, WorkRecordFilters};

const WORK_RECORD_COLUMNS: &str = "id, employee_id, work_date, work_type_id, work_item_id, quantity, unit_price, total_amount, is_overtime, overtime_quantity, overtime_hours, status, notes, created_by, created_at, updated_at";

/// Half-open [first day, first day of next month) range for a calendar
/// month; dates are stored ISO-formatted so range scans stay indexable.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

#[derive(Clone)]
pub struct WorkRecordRepository {
    pool: SqlitePool,
}

impl WorkRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a fully priced record. Pricing snapshots are computed by the
    /// service layer before this point; the store never derives amounts.
    pub async fn insert(&self, record: &WorkRecord) -> Result<WorkRecord> {
        let inserted = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            INSERT INTO work_records (id, employee_id, work_date, work_type_id, work_item_id, quantity, unit_price, total_amount, is_overtime, overtime_quantity, overtime_hours, status, notes, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {WORK_RECORD_COLUMNS}
            "#
        ))
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(record.work_date)
        .bind(&record.work_type_id)
        .bind(&record.work_item_id)
        .bind(record.quantity)
        .bind(record.unit_price)
        .bind(record.total_amount)
        .bind(record.is_overtime)
        .bind(record.overtime_quantity)
        .bind(record.overtime_hours)
        .bind(record.status)
        .bind(&record.notes)
        .bind(&record.created_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    pub async fn update(&self, record: &WorkRecord) -> Result<Option<WorkRecord>> {
        let updated = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            UPDATE work_records
            SET employee_id = ?, work_date = ?, work_type_id = ?, work_item_id = ?,
                quantity = ?, unit_price = ?, total_amount = ?, is_overtime = ?,
                overtime_quantity = ?, overtime_hours = ?, notes = ?, updated_at = ?
            WHERE id = ?
            RETURNING {WORK_RECORD_COLUMNS}
            "#
        ))
        .bind(&record.employee_id)
        .bind(record.work_date)
        .bind(&record.work_type_id)
        .bind(&record.work_item_id)
        .bind(record.quantity)
        .bind(record.unit_price)
        .bind(record.total_amount)
        .bind(record.is_overtime)
        .bind(record.overtime_quantity)
        .bind(record.overtime_hours)
        .bind(&record.notes)
        .bind(record.updated_at)
        .bind(&record.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<WorkRecord>> {
        let record = sqlx::query_as::<_, WorkRecord>(&format!(
            "SELECT {WORK_RECORD_COLUMNS} FROM work_records WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM work_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        filters: &WorkRecordFilters,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<WorkRecord>, i64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if filters.employee_id.is_some() {
            conditions.push("employee_id = ?");
        }
        if filters.date_from.is_some() {
            conditions.push("work_date >= ?");
        }
        if filters.date_to.is_some() {
            conditions.push("work_date <= ?");
        }
        if filters.work_type_id.is_some() {
            conditions.push("work_type_id = ?");
        }
        if filters.status.is_some() {
            conditions.push("status = ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM work_records {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(employee_id) = &filters.employee_id {
            count_query = count_query.bind(employee_id.clone());
        }
        if let Some(date_from) = filters.date_from {
            count_query = count_query.bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            count_query = count_query.bind(date_to);
        }
        if let Some(work_type_id) = &filters.work_type_id {
            count_query = count_query.bind(work_type_id.clone());
        }
        if let Some(status) = filters.status {
            count_query = count_query.bind(status);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let page_sql = format!(
            "SELECT {WORK_RECORD_COLUMNS} FROM work_records {where_clause} ORDER BY work_date DESC, created_at DESC LIMIT ? OFFSET ?"
        );
        let mut page_query = sqlx::query_as::<_, WorkRecord>(&page_sql);
        if let Some(employee_id) = &filters.employee_id {
            page_query = page_query.bind(employee_id.clone());
        }
        if let Some(date_from) = filters.date_from {
            page_query = page_query.bind(date_from);
        }
        if let Some(date_to) = filters.date_to {
            page_query = page_query.bind(date_to);
        }
        if let Some(work_type_id) = &filters.work_type_id {
            page_query = page_query.bind(work_type_id.clone());
        }
        if let Some(status) = filters.status {
            page_query = page_query.bind(status);
        }
        let records = page_query
            .bind(page_size)
            .bind((page - 1).max(0) * page_size)
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn get_by_employee_and_month(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<WorkRecord>> {
        let Some((start, end)) = month_bounds(year, month) else {
            return Ok(Vec::new());
        };

        let records = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            SELECT {WORK_RECORD_COLUMNS} FROM work_records
            WHERE employee_id = ? AND work_date >= ? AND work_date < ?
            ORDER BY work_date
            "#
        ))
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Records still eligible for settlement (status `new`).
    pub async fn get_unpaid_by_employee(&self, employee_id: &str) -> Result<Vec<WorkRecord>> {
        let records = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            SELECT {WORK_RECORD_COLUMNS} FROM work_records
            WHERE employee_id = ? AND status = 'new'
            ORDER BY work_date
            "#
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Audit trail: the records snapshotted under a settlement.
    pub async fn get_by_monthly_salary_id(&self, monthly_salary_id: &str) -> Result<Vec<WorkRecord>> {
        let records = sqlx::query_as::<_, WorkRecord>(&format!(
            r#"
            SELECT {}
            FROM work_records wr
            INNER JOIN monthly_salary_work_records mswr ON mswr.work_record_id = wr.id
            WHERE mswr.monthly_salary_id = ?
            ORDER BY wr.work_date
            "#,
            WORK_RECORD_COLUMNS
                .split(", ")
                .map(|c| format!("wr.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .bind(monthly_salary_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Total quantity recorded against a work item, optionally excluding
    /// one record (used when re-validating an edit against the target).
    pub async fn total_quantity_made(
        &self,
        work_item_id: &str,
        exclude_record_id: Option<&str>,
    ) -> Result<f64> {
        let made: f64 = match exclude_record_id {
            Some(exclude_id) => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(quantity), 0.0) FROM work_records WHERE work_item_id = ? AND id != ?",
                )
                .bind(work_item_id)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(quantity), 0.0) FROM work_records WHERE work_item_id = ?",
                )
                .bind(work_item_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(made)
    }

    /// Hours an employee already has on one date across hourly records,
    /// overtime included. Backs the daily-hour cap.
    pub async fn total_hours_in_day(
        &self,
        employee_id: &str,
        work_date: NaiveDate,
        exclude_record_id: Option<&str>,
    ) -> Result<f64> {
        let base_sql = r#"
            SELECT COALESCE(SUM(wr.quantity + COALESCE(wr.overtime_hours, 0.0)), 0.0)
            FROM work_records wr
            INNER JOIN work_types wt ON wt.id = wr.work_type_id
            WHERE wr.employee_id = ? AND wr.work_date = ? AND wt.calculation_type = 'hourly'
        "#;

        let hours: f64 = match exclude_record_id {
            Some(exclude_id) => {
                sqlx::query_scalar(&format!("{base_sql} AND wr.id != ?"))
                    .bind(employee_id)
                    .bind(work_date)
                    .bind(exclude_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar(base_sql)
                    .bind(employee_id)
                    .bind(work_date)
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(hours)
    }
}
