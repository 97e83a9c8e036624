use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum EmployeeStatus {
        #[serde(rename = "active")]
        Active => "active",
        #[serde(rename = "inactive")]
        Inactive => "inactive",
    }
}

impl Default for EmployeeStatus {
    fn default() -> Self {
        EmployeeStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    /// Monthly default salary, used as a fallback when a month has no
    /// work records.
    pub salary: Option<f64>,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
}

/// Slim employee projection embedded in salary and record responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: String,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
}
