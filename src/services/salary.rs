use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use crate::database::models::{
    BatchCalculateResult, BatchEmployeeOutcome, CalculateSalaryInput, MonthlySalaryResponse,
    SettlementStatus, WorkRecord,
};
use crate::database::repositories::{
    EmployeeRepository, MonthlySalaryRepository, WorkRecordRepository,
};
use crate::error::AppError;

/// Monthly settlement engine: turns work records into drafts, pays drafts
/// (merging partials), and unwinds paid settlements.
#[derive(Clone)]
pub struct SalaryService {
    salaries: MonthlySalaryRepository,
    work_records: WorkRecordRepository,
    employees: EmployeeRepository,
}

impl SalaryService {
    pub fn new(
        salaries: MonthlySalaryRepository,
        work_records: WorkRecordRepository,
        employees: EmployeeRepository,
    ) -> Self {
        Self {
            salaries,
            work_records,
            employees,
        }
    }

    /// `year`+`month` select the explicit-period strategy; omitting both
    /// switches to status-driven auto-detection. The two modes keep their
    /// own failure and idempotence semantics and are never mixed.
    pub async fn calculate(&self, input: CalculateSalaryInput) -> Result<MonthlySalaryResponse> {
        match (input.year, input.month) {
            (Some(year), Some(month)) => {
                self.calculate_explicit(&input.employee_id, year, month).await
            }
            (None, None) => self.calculate_auto(&input.employee_id).await,
            _ => Err(AppError::validation("Year and month must be provided together").into()),
        }
    }

    async fn calculate_explicit(
        &self,
        employee_id: &str,
        year: i32,
        month: i32,
    ) -> Result<MonthlySalaryResponse> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation("Month must be between 1 and 12").into());
        }

        let employee = self
            .employees
            .get_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;

        // Paid settlements are immutable; the period is closed.
        let paid = self
            .salaries
            .get_for_period(employee_id, year, month, SettlementStatus::Paid)
            .await?;
        if !paid.is_empty() {
            return Err(AppError::conflict(
                "Cannot recalculate a salary that is already paid",
            )
            .into());
        }

        let records = self
            .work_records
            .get_by_employee_and_month(employee_id, year, month as u32)
            .await?;

        let (total_amount, total_work_days, record_ids) = if records.is_empty() {
            // A month without records falls back to the employee's default
            // salary when one is configured.
            let default_salary = employee.salary.unwrap_or(0.0);
            if default_salary <= 0.0 {
                return Err(AppError::validation(format!(
                    "No salary data for employee {}",
                    employee.full_name()
                ))
                .into());
            }
            (default_salary, 0, Vec::new())
        } else {
            summarize(&records)
        };

        let drafts = self
            .salaries
            .get_for_period(employee_id, year, month, SettlementStatus::Draft)
            .await?;

        let salary = match drafts.first() {
            // Explicit-period recompute is an in-place update while the
            // settlement is still a draft.
            Some(draft) => {
                self.salaries
                    .update_draft(&draft.id, total_work_days, total_amount, &record_ids)
                    .await?
            }
            None => {
                self.salaries
                    .create_draft(
                        employee_id,
                        year,
                        month,
                        total_work_days,
                        total_amount,
                        &record_ids,
                    )
                    .await?
            }
        };

        self.response(&salary.id).await
    }

    async fn calculate_auto(&self, employee_id: &str) -> Result<MonthlySalaryResponse> {
        let employee = self
            .employees
            .get_by_id(employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("Employee not found"))?;

        let records = self.work_records.get_unpaid_by_employee(employee_id).await?;
        if records.is_empty() {
            return Err(AppError::validation(format!(
                "No unsettled work records for employee {}",
                employee.full_name()
            ))
            .into());
        }

        let (year, month) = majority_month(&records);

        // No automatic recompute in this mode: a stale draft must be
        // deleted explicitly first.
        let drafts = self
            .salaries
            .get_for_period(employee_id, year, month, SettlementStatus::Draft)
            .await?;
        if !drafts.is_empty() {
            return Err(AppError::conflict(format!(
                "A draft settlement already exists for {month}/{year}; delete it before recalculating"
            ))
            .into());
        }

        let (total_amount, total_work_days, record_ids) = summarize(&records);

        let salary = self
            .salaries
            .create_draft(
                employee_id,
                year,
                month,
                total_work_days,
                total_amount,
                &record_ids,
            )
            .await?;

        self.response(&salary.id).await
    }

    /// Run the explicit-period calculation for every active employee. One
    /// employee failing never aborts the rest; the caller gets a
    /// per-employee outcome list.
    pub async fn calculate_for_all(&self, year: i32, month: i32) -> Result<BatchCalculateResult> {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation("Month must be between 1 and 12").into());
        }

        let employees = self.employees.list_active().await?;
        let mut results = Vec::with_capacity(employees.len());

        for employee in &employees {
            match self.calculate_explicit(&employee.id, year, month).await {
                Ok(_) => results.push(BatchEmployeeOutcome {
                    employee_id: employee.id.clone(),
                    employee_name: employee.full_name(),
                    success: true,
                    message: None,
                }),
                Err(err) => {
                    log::warn!(
                        "Salary calculation failed for employee {}: {}",
                        employee.id,
                        err
                    );
                    results.push(BatchEmployeeOutcome {
                        employee_id: employee.id.clone(),
                        employee_name: employee.full_name(),
                        success: false,
                        message: Some(err.to_string()),
                    });
                }
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;

        Ok(BatchCalculateResult {
            total: employees.len(),
            succeeded,
            failed,
            results,
        })
    }

    pub async fn pay(&self, id: &str) -> Result<MonthlySalaryResponse> {
        let paid = self.salaries.pay(id).await?;
        self.response(&paid.id).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.salaries.delete(id).await
    }

    pub async fn update_allowances(
        &self,
        id: &str,
        allowances: f64,
    ) -> Result<MonthlySalaryResponse> {
        if allowances < 0.0 {
            return Err(AppError::validation("Allowances must be >= 0").into());
        }

        let updated = self
            .salaries
            .update_allowances(id, allowances)
            .await?
            .ok_or_else(|| AppError::not_found("Monthly salary not found"))?;

        self.response(&updated.id).await
    }

    async fn response(&self, id: &str) -> Result<MonthlySalaryResponse> {
        self.salaries
            .get_response_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Monthly salary not found").into())
    }
}

/// Total amount, distinct work days, and ids for a record selection. A
/// double shift on one date counts one day.
fn summarize(records: &[WorkRecord]) -> (f64, i32, Vec<String>) {
    let total_amount: f64 = records.iter().map(|r| r.total_amount).sum();
    let distinct_days = records
        .iter()
        .map(|r| r.work_date)
        .collect::<HashSet<NaiveDate>>()
        .len() as i32;
    let record_ids = records.iter().map(|r| r.id.clone()).collect();

    (total_amount, distinct_days, record_ids)
}

/// The month holding the most records wins; ties go to the month containing
/// the latest work date.
fn majority_month(records: &[WorkRecord]) -> (i32, i32) {
    let mut tally: BTreeMap<(i32, i32), (usize, NaiveDate)> = BTreeMap::new();
    for record in records {
        let key = (record.work_date.year(), record.work_date.month() as i32);
        let entry = tally
            .entry(key)
            .or_insert((0, record.work_date));
        entry.0 += 1;
        if record.work_date > entry.1 {
            entry.1 = record.work_date;
        }
    }

    tally
        .into_iter()
        .max_by(|a, b| (a.1.0, a.1.1).cmp(&(b.1.0, b.1.1)))
        .map(|((year, month), _)| (year, month))
        .expect("majority_month called with at least one record")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(date: &str, amount: f64) -> WorkRecord {
        let now = Utc::now();
        WorkRecord {
            id: uuid::Uuid::new_v4().to_string(),
            employee_id: "emp-1".to_string(),
            work_date: date.parse().unwrap(),
            work_type_id: "wt-1".to_string(),
            work_item_id: None,
            quantity: 1.0,
            unit_price: amount,
            total_amount: amount,
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
            status: Default::default(),
            notes: None,
            created_by: "user-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn summarize_counts_distinct_days_not_records() {
        let records = vec![
            record("2024-03-04", 20_000.0),
            record("2024-03-04", 10_000.0),
            record("2024-03-05", 5_000.0),
        ];
        let (total, days, ids) = summarize(&records);

        assert_eq!(total, 35_000.0);
        assert_eq!(days, 2);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn majority_month_picks_the_busiest_month() {
        let records = vec![
            record("2024-02-27", 1.0),
            record("2024-03-04", 1.0),
            record("2024-03-05", 1.0),
        ];
        assert_eq!(majority_month(&records), (2024, 3));
    }

    #[test]
    fn majority_month_breaks_ties_by_latest_date() {
        let records = vec![
            record("2024-02-27", 1.0),
            record("2024-02-28", 1.0),
            record("2024-03-04", 1.0),
            record("2024-03-05", 1.0),
        ];
        assert_eq!(majority_month(&records), (2024, 3));
    }
}
