use anyhow::Result;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{
    MonthlySalary, MonthlySalaryResponse, MonthlySalaryWithEmployeeRow, SalaryFilters,
    SettlementStatus,
};
use crate::error::AppError;

const SALARY_COLUMNS: &str = "id, employee_id, year, month, total_work_days, total_amount, allowances, status, calculated_at, paid_at, created_at, updated_at";

const SALARY_JOIN_COLUMNS: &str = r#"
    ms.id, ms.employee_id, ms.year, ms.month, ms.total_work_days, ms.total_amount,
    ms.allowances, ms.status, ms.calculated_at, ms.paid_at, ms.created_at, ms.updated_at,
    e.employee_code, e.first_name, e.last_name
"#;

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[derive(Clone)]
pub struct MonthlySalaryRepository {
    pool: SqlitePool,
}

impl MonthlySalaryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<MonthlySalary>> {
        let salary = sqlx::query_as::<_, MonthlySalary>(&format!(
            "SELECT {SALARY_COLUMNS} FROM monthly_salaries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(salary)
    }

    pub async fn get_response_by_id(&self, id: &str) -> Result<Option<MonthlySalaryResponse>> {
        let row = sqlx::query_as::<_, MonthlySalaryWithEmployeeRow>(&format!(
            r#"
            SELECT {SALARY_JOIN_COLUMNS}
            FROM monthly_salaries ms
            LEFT JOIN employees e ON e.id = ms.employee_id
            WHERE ms.id = ?
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MonthlySalaryResponse::from))
    }

    pub async fn list(
        &self,
        filters: &SalaryFilters,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<MonthlySalaryResponse>, i64)> {
        let mut conditions: Vec<&str> = Vec::new();
        if filters.employee_id.is_some() {
            conditions.push("ms.employee_id = ?");
        }
        if filters.year.is_some() {
            conditions.push("ms.year = ?");
        }
        if filters.month.is_some() {
            conditions.push("ms.month = ?");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM monthly_salaries ms {where_clause}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(employee_id) = &filters.employee_id {
            count_query = count_query.bind(employee_id.clone());
        }
        if let Some(year) = filters.year {
            count_query = count_query.bind(year);
        }
        if let Some(month) = filters.month {
            count_query = count_query.bind(month);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let page_sql = format!(
            r#"
            SELECT {SALARY_JOIN_COLUMNS}
            FROM monthly_salaries ms
            LEFT JOIN employees e ON e.id = ms.employee_id
            {where_clause}
            ORDER BY ms.year DESC, ms.month DESC, e.last_name, e.first_name
            LIMIT ? OFFSET ?
            "#
        );
        let mut page_query = sqlx::query_as::<_, MonthlySalaryWithEmployeeRow>(&page_sql);
        if let Some(employee_id) = &filters.employee_id {
            page_query = page_query.bind(employee_id.clone());
        }
        if let Some(year) = filters.year {
            page_query = page_query.bind(year);
        }
        if let Some(month) = filters.month {
            page_query = page_query.bind(month);
        }
        let rows = page_query
            .bind(page_size)
            .bind((page - 1).max(0) * page_size)
            .fetch_all(&self.pool)
            .await?;

        Ok((
            rows.into_iter().map(MonthlySalaryResponse::from).collect(),
            total,
        ))
    }

    pub async fn get_for_period(
        &self,
        employee_id: &str,
        year: i32,
        month: i32,
        status: SettlementStatus,
    ) -> Result<Vec<MonthlySalary>> {
        let salaries = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            SELECT {SALARY_COLUMNS} FROM monthly_salaries
            WHERE employee_id = ? AND year = ? AND month = ? AND status = ?
            ORDER BY created_at
            "#
        ))
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(salaries)
    }

    /// Insert a new draft and snapshot the selected record ids into the
    /// junction table, re-verifying inside the transaction that no other
    /// draft covers the period.
    pub async fn create_draft(
        &self,
        employee_id: &str,
        year: i32,
        month: i32,
        total_work_days: i32,
        total_amount: f64,
        record_ids: &[String],
    ) -> Result<MonthlySalary> {
        let mut tx = self.pool.begin().await?;

        let existing_drafts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM monthly_salaries WHERE employee_id = ? AND year = ? AND month = ? AND status = ?",
        )
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .bind(SettlementStatus::Draft)
        .fetch_one(&mut *tx)
        .await?;

        if existing_drafts > 0 {
            return Err(AppError::conflict(format!(
                "A draft settlement already exists for {month}/{year}; delete it before recalculating"
            ))
            .into());
        }

        let now = Utc::now();
        let salary = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            INSERT INTO monthly_salaries (id, employee_id, year, month, total_work_days, total_amount, allowances, status, calculated_at, paid_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, NULL, ?, ?)
            RETURNING {SALARY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(employee_id)
        .bind(year)
        .bind(month)
        .bind(total_work_days)
        .bind(total_amount)
        .bind(SettlementStatus::Draft)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_junction_rows(&mut tx, &salary.id, record_ids).await?;

        tx.commit().await?;
        Ok(salary)
    }

    /// Recompute an existing draft in place: refresh the totals and replace
    /// the junction snapshot. Fails with a conflict if the row is no longer
    /// a draft.
    pub async fn update_draft(
        &self,
        id: &str,
        total_work_days: i32,
        total_amount: f64,
        record_ids: &[String],
    ) -> Result<MonthlySalary> {
        let mut tx = self.pool.begin().await?;

        let now = Utc::now();
        let updated = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            UPDATE monthly_salaries
            SET total_work_days = ?, total_amount = ?, calculated_at = ?, updated_at = ?
            WHERE id = ? AND status = ?
            RETURNING {SALARY_COLUMNS}
            "#
        ))
        .bind(total_work_days)
        .bind(total_amount)
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(SettlementStatus::Draft)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(salary) = updated else {
            return Err(
                AppError::conflict("Cannot recalculate a settlement that is already paid").into(),
            );
        };

        sqlx::query("DELETE FROM monthly_salary_work_records WHERE monthly_salary_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::insert_junction_rows(&mut tx, &salary.id, record_ids).await?;

        tx.commit().await?;
        Ok(salary)
    }

    /// Settle a draft. With a single draft and no previously paid rows for
    /// the period this is a plain status flip; otherwise every draft and
    /// paid settlement for the employee+period is folded into one new paid
    /// row carrying the union of their work records.
    pub async fn pay(&self, id: &str) -> Result<MonthlySalary> {
        let mut tx = self.pool.begin().await?;

        let settlement = sqlx::query_as::<_, MonthlySalary>(&format!(
            "SELECT {SALARY_COLUMNS} FROM monthly_salaries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Monthly salary not found"))?;

        if settlement.status == SettlementStatus::Paid {
            return Err(AppError::conflict("Settlement is already paid").into());
        }

        let drafts = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            SELECT {SALARY_COLUMNS} FROM monthly_salaries
            WHERE employee_id = ? AND year = ? AND month = ? AND status = ?
            ORDER BY created_at
            "#
        ))
        .bind(&settlement.employee_id)
        .bind(settlement.year)
        .bind(settlement.month)
        .bind(SettlementStatus::Draft)
        .fetch_all(&mut *tx)
        .await?;

        let paid = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            SELECT {SALARY_COLUMNS} FROM monthly_salaries
            WHERE employee_id = ? AND year = ? AND month = ? AND status = ?
            ORDER BY created_at
            "#
        ))
        .bind(&settlement.employee_id)
        .bind(settlement.year)
        .bind(settlement.month)
        .bind(SettlementStatus::Paid)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();

        if drafts.len() == 1 && paid.is_empty() {
            // Compare-and-swap on status: a concurrent pay of the same
            // draft loses here and surfaces as a conflict.
            let flipped = sqlx::query(
                "UPDATE monthly_salaries SET status = ?, paid_at = ?, updated_at = ? WHERE id = ? AND status = ?",
            )
            .bind(SettlementStatus::Paid)
            .bind(now)
            .bind(now)
            .bind(id)
            .bind(SettlementStatus::Draft)
            .execute(&mut *tx)
            .await?;

            if flipped.rows_affected() == 0 {
                return Err(AppError::conflict("Settlement is already paid").into());
            }

            sqlx::query(
                r#"
                UPDATE work_records SET status = 'paid', updated_at = ?
                WHERE id IN (SELECT work_record_id FROM monthly_salary_work_records WHERE monthly_salary_id = ?)
                "#,
            )
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            return Ok(self
                .get_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("Monthly salary not found"))?);
        }

        // Merge path: fold every draft and previously paid settlement for
        // this employee+period into a single paid row.
        let merged: Vec<&MonthlySalary> = drafts.iter().chain(paid.iter()).collect();
        let total_amount: f64 = merged.iter().map(|s| s.total_amount).sum();
        let allowances: f64 = merged.iter().map(|s| s.allowances).sum();
        let total_work_days: i32 = merged.iter().map(|s| s.total_work_days).sum();
        let merged_ids: Vec<String> = merged.iter().map(|s| s.id.clone()).collect();

        let record_ids_sql = format!(
            "SELECT DISTINCT work_record_id FROM monthly_salary_work_records WHERE monthly_salary_id IN ({})",
            placeholders(merged_ids.len())
        );
        let mut record_ids_query = sqlx::query_scalar::<_, String>(&record_ids_sql);
        for merged_id in &merged_ids {
            record_ids_query = record_ids_query.bind(merged_id.clone());
        }
        let record_ids: Vec<String> = record_ids_query.fetch_all(&mut *tx).await?;

        if !record_ids.is_empty() {
            let update_sql = format!(
                "UPDATE work_records SET status = 'paid', updated_at = ? WHERE id IN ({})",
                placeholders(record_ids.len())
            );
            let mut update_query = sqlx::query(&update_sql).bind(now);
            for record_id in &record_ids {
                update_query = update_query.bind(record_id.clone());
            }
            update_query.execute(&mut *tx).await?;
        }

        let delete_sql = format!(
            "DELETE FROM monthly_salaries WHERE id IN ({})",
            placeholders(merged_ids.len())
        );
        let mut delete_query = sqlx::query(&delete_sql);
        for merged_id in &merged_ids {
            delete_query = delete_query.bind(merged_id.clone());
        }
        delete_query.execute(&mut *tx).await?;

        let merged_salary = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            INSERT INTO monthly_salaries (id, employee_id, year, month, total_work_days, total_amount, allowances, status, calculated_at, paid_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {SALARY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&settlement.employee_id)
        .bind(settlement.year)
        .bind(settlement.month)
        .bind(total_work_days)
        .bind(total_amount)
        .bind(allowances)
        .bind(SettlementStatus::Paid)
        .bind(now)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_junction_rows(&mut tx, &merged_salary.id, &record_ids).await?;

        tx.commit().await?;
        Ok(merged_salary)
    }

    /// Remove a settlement. Deleting a paid settlement first reverts every
    /// linked work record to `new` so the amounts become aggregatable
    /// again; drafts never flipped their records, so they delete directly.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let settlement = sqlx::query_as::<_, MonthlySalary>(&format!(
            "SELECT {SALARY_COLUMNS} FROM monthly_salaries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Monthly salary not found"))?;

        if settlement.status == SettlementStatus::Paid {
            sqlx::query(
                r#"
                UPDATE work_records SET status = 'new', updated_at = ?
                WHERE id IN (SELECT work_record_id FROM monthly_salary_work_records WHERE monthly_salary_id = ?)
                "#,
            )
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM monthly_salaries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_allowances(&self, id: &str, allowances: f64) -> Result<Option<MonthlySalary>> {
        let updated = sqlx::query_as::<_, MonthlySalary>(&format!(
            r#"
            UPDATE monthly_salaries SET allowances = ?, updated_at = ?
            WHERE id = ?
            RETURNING {SALARY_COLUMNS}
            "#
        ))
        .bind(allowances)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn insert_junction_rows(
        tx: &mut Transaction<'_, Sqlite>,
        monthly_salary_id: &str,
        record_ids: &[String],
    ) -> Result<()> {
        let now = Utc::now();
        for record_id in record_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO monthly_salary_work_records (monthly_salary_id, work_record_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(monthly_salary_id)
            .bind(record_id)
            .bind(now)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
