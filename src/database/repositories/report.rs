use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::{NaiveDate, Weekday};
use sqlx::SqlitePool;

use crate::database::models::{DepartmentBreakdown, WorkReport, WorkTypeBreakdown};
use crate::error::AppError;

/// Flat row feeding the weekly rollup: one paid work record with its
/// employee and work-type dimensions.
#[derive(Debug, sqlx::FromRow)]
struct PaidRecordRow {
    work_date: NaiveDate,
    total_amount: f64,
    employee_id: String,
    department: Option<String>,
    work_type_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct PaidSettlementRow {
    employee_id: String,
    total_amount: f64,
    allowances: f64,
    total_work_days: i64,
    department: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilters {
    pub department: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Weekly rollup over paid work records in the ISO week. Record status
    /// `paid` is exactly "covered by a paid settlement", so unpaid months
    /// drop out without a junction probe.
    pub async fn weekly(&self, year: i32, week: u32, filters: &ReportFilters) -> Result<WorkReport> {
        let period = format!("Week {week}, {year}");

        let week_start = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            .ok_or_else(|| AppError::validation(format!("Invalid ISO week {week}/{year}")))?;
        let week_end = week_start + chrono::Days::new(6);

        let mut sql = String::from(
            r#"
            SELECT wr.work_date, wr.total_amount, wr.employee_id,
                   e.department, wt.name AS work_type_name
            FROM work_records wr
            LEFT JOIN employees e ON e.id = wr.employee_id
            LEFT JOIN work_types wt ON wt.id = wr.work_type_id
            WHERE wr.status = 'paid' AND wr.work_date >= ? AND wr.work_date <= ?
            "#,
        );
        if filters.department.is_some() {
            sql.push_str(" AND e.department = ?");
        }
        if filters.employee_id.is_some() {
            sql.push_str(" AND wr.employee_id = ?");
        }

        let mut query = sqlx::query_as::<_, PaidRecordRow>(&sql)
            .bind(week_start)
            .bind(week_end);
        if let Some(department) = &filters.department {
            query = query.bind(department.clone());
        }
        if let Some(employee_id) = &filters.employee_id {
            query = query.bind(employee_id.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(Self::rollup_records(period, rows))
    }

    /// Monthly rollup driven from paid settlements: amounts come from the
    /// settlement rows themselves, the work-type breakdown from the records
    /// they snapshot. Default-salary settlements (zero work days) surface
    /// under a synthetic work-type bucket instead of disappearing.
    pub async fn monthly(
        &self,
        year: i32,
        month: u32,
        filters: &ReportFilters,
    ) -> Result<WorkReport> {
        let period = format!("{month}/{year}");

        let mut sql = String::from(
            r#"
            SELECT ms.employee_id, ms.total_amount, ms.allowances, ms.total_work_days,
                   e.department
            FROM monthly_salaries ms
            LEFT JOIN employees e ON e.id = ms.employee_id
            WHERE ms.year = ? AND ms.month = ? AND ms.status = 'Thanh toán'
            "#,
        );
        if filters.department.is_some() {
            sql.push_str(" AND e.department = ?");
        }
        if filters.employee_id.is_some() {
            sql.push_str(" AND ms.employee_id = ?");
        }

        let mut query = sqlx::query_as::<_, PaidSettlementRow>(&sql)
            .bind(year)
            .bind(month as i32);
        if let Some(department) = &filters.department {
            query = query.bind(department.clone());
        }
        if let Some(employee_id) = &filters.employee_id {
            query = query.bind(employee_id.clone());
        }
        let settlements = query.fetch_all(&self.pool).await?;

        if settlements.is_empty() {
            return Ok(WorkReport::empty(period));
        }

        let total_amount: f64 = settlements
            .iter()
            .map(|s| s.total_amount + s.allowances)
            .sum();
        let total_work_days: i64 = settlements.iter().map(|s| s.total_work_days).sum();
        let total_employees = settlements
            .iter()
            .map(|s| s.employee_id.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;

        let mut by_department: BTreeMap<String, (f64, i64)> = BTreeMap::new();
        for settlement in &settlements {
            let department = settlement
                .department
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            let entry = by_department.entry(department).or_default();
            entry.0 += settlement.total_amount + settlement.allowances;
            entry.1 += settlement.total_work_days;
        }

        // Work-type breakdown from the snapshotted records of the same
        // settlements.
        let mut breakdown_sql = String::from(
            r#"
            SELECT wt.name AS work_type_name, wr.total_amount
            FROM monthly_salaries ms
            INNER JOIN monthly_salary_work_records mswr ON mswr.monthly_salary_id = ms.id
            INNER JOIN work_records wr ON wr.id = mswr.work_record_id
            LEFT JOIN employees e ON e.id = ms.employee_id
            LEFT JOIN work_types wt ON wt.id = wr.work_type_id
            WHERE ms.year = ? AND ms.month = ? AND ms.status = 'Thanh toán'
            "#,
        );
        if filters.department.is_some() {
            breakdown_sql.push_str(" AND e.department = ?");
        }
        if filters.employee_id.is_some() {
            breakdown_sql.push_str(" AND ms.employee_id = ?");
        }

        let mut breakdown_query =
            sqlx::query_as::<_, (Option<String>, f64)>(&breakdown_sql)
                .bind(year)
                .bind(month as i32);
        if let Some(department) = &filters.department {
            breakdown_query = breakdown_query.bind(department.clone());
        }
        if let Some(employee_id) = &filters.employee_id {
            breakdown_query = breakdown_query.bind(employee_id.clone());
        }
        let breakdown_rows = breakdown_query.fetch_all(&self.pool).await?;

        let mut by_work_type: BTreeMap<String, (f64, i64)> = BTreeMap::new();
        for (work_type_name, amount) in breakdown_rows {
            let name = work_type_name.unwrap_or_else(|| "Unknown".to_string());
            let entry = by_work_type.entry(name).or_default();
            entry.0 += amount;
            entry.1 += 1;
        }

        for settlement in settlements
            .iter()
            .filter(|s| s.total_work_days == 0)
        {
            let entry = by_work_type.entry("Default salary".to_string()).or_default();
            entry.0 += settlement.total_amount + settlement.allowances;
            entry.1 += 1;
        }

        Ok(WorkReport {
            period,
            total_employees,
            total_work_days,
            total_amount,
            by_department: by_department
                .into_iter()
                .map(|(department, (amount, days))| DepartmentBreakdown {
                    department,
                    total_amount: amount,
                    total_work_days: days,
                })
                .collect(),
            by_work_type: by_work_type
                .into_iter()
                .map(|(work_type_name, (amount, count))| WorkTypeBreakdown {
                    work_type_name,
                    total_amount: amount,
                    count,
                })
                .collect(),
        })
    }

    fn rollup_records(period: String, rows: Vec<PaidRecordRow>) -> WorkReport {
        if rows.is_empty() {
            return WorkReport::empty(period);
        }

        let total_amount: f64 = rows.iter().map(|r| r.total_amount).sum();
        let total_employees = rows
            .iter()
            .map(|r| r.employee_id.as_str())
            .collect::<HashSet<_>>()
            .len() as i64;
        let total_work_days = rows
            .iter()
            .map(|r| r.work_date)
            .collect::<HashSet<_>>()
            .len() as i64;

        let mut department_amounts: BTreeMap<String, f64> = BTreeMap::new();
        let mut department_days: BTreeMap<String, HashSet<NaiveDate>> = BTreeMap::new();
        let mut by_work_type: BTreeMap<String, (f64, i64)> = BTreeMap::new();

        for row in &rows {
            let department = row
                .department
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            *department_amounts.entry(department.clone()).or_default() += row.total_amount;
            department_days
                .entry(department)
                .or_default()
                .insert(row.work_date);

            let work_type = row
                .work_type_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string());
            let entry = by_work_type.entry(work_type).or_default();
            entry.0 += row.total_amount;
            entry.1 += 1;
        }

        WorkReport {
            period,
            total_employees,
            total_work_days,
            total_amount,
            by_department: department_amounts
                .into_iter()
                .map(|(department, amount)| {
                    let days = department_days
                        .get(&department)
                        .map(|dates| dates.len() as i64)
                        .unwrap_or(0);
                    DepartmentBreakdown {
                        department,
                        total_amount: amount,
                        total_work_days: days,
                    }
                })
                .collect(),
            by_work_type: by_work_type
                .into_iter()
                .map(|(work_type_name, (amount, count))| WorkTypeBreakdown {
                    work_type_name,
                    total_amount: amount,
                    count,
                })
                .collect(),
        }
    }
}
