use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::employee::EmployeeSummary;
use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum SettlementStatus {
        #[serde(rename = "Tạm tính")]
        Draft => "Tạm tính",
        #[serde(rename = "Thanh toán")]
        Paid => "Thanh toán",
    }
}

/// An employee's payable total for one period. Drafts are recomputable and
/// mutable; a paid settlement is immutable except for deletion with
/// reversal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalary {
    pub id: String,
    pub employee_id: String,
    pub year: i32,
    pub month: i32,
    pub total_work_days: i32,
    pub total_amount: f64,
    pub allowances: f64,
    pub status: SettlementStatus,
    pub calculated_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for listings that join the employee dimension.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlySalaryWithEmployeeRow {
    pub id: String,
    pub employee_id: String,
    pub year: i32,
    pub month: i32,
    pub total_work_days: i32,
    pub total_amount: f64,
    pub allowances: f64,
    pub status: SettlementStatus,
    pub calculated_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub employee_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalaryResponse {
    #[serde(flatten)]
    pub salary: MonthlySalary,
    pub employee: Option<EmployeeSummary>,
}

impl From<MonthlySalaryWithEmployeeRow> for MonthlySalaryResponse {
    fn from(row: MonthlySalaryWithEmployeeRow) -> Self {
        let employee = match (row.employee_code, row.first_name, row.last_name) {
            (Some(employee_code), Some(first_name), Some(last_name)) => Some(EmployeeSummary {
                id: row.employee_id.clone(),
                employee_code,
                first_name,
                last_name,
            }),
            _ => None,
        };

        MonthlySalaryResponse {
            salary: MonthlySalary {
                id: row.id,
                employee_id: row.employee_id,
                year: row.year,
                month: row.month,
                total_work_days: row.total_work_days,
                total_amount: row.total_amount,
                allowances: row.allowances,
                status: row.status,
                calculated_at: row.calculated_at,
                paid_at: row.paid_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            employee,
        }
    }
}

/// Input for the calculate operation. `year` and `month` select the
/// explicit-period strategy; leaving both out selects status-driven
/// auto-detection over the employee's unpaid records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateSalaryInput {
    pub employee_id: String,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCalculateInput {
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmployeeOutcome {
    pub employee_id: String,
    pub employee_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCalculateResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchEmployeeOutcome>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAllowancesInput {
    pub allowances: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SalaryFilters {
    pub employee_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}
