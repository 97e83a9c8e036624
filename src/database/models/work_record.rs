use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum WorkRecordStatus {
        #[serde(rename = "new")]
        New => "new",
        #[serde(rename = "paid")]
        Paid => "paid",
    }
}

impl Default for WorkRecordStatus {
    fn default() -> Self {
        WorkRecordStatus::New
    }
}

/// One logged unit of work by one employee on one date. `unit_price` and
/// `total_amount` are snapshots taken when the record is written; later
/// catalog edits never change historical earnings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub id: String,
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub work_type_id: String,
    pub work_item_id: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub is_overtime: bool,
    pub overtime_quantity: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub status: WorkRecordStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkRecordInput {
    pub employee_id: String,
    pub work_date: NaiveDate,
    pub work_type_id: String,
    pub work_item_id: Option<String>,
    pub quantity: f64,
    /// Hourly/daily override; weld-count records always snapshot the work
    /// item's price per weld.
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub is_overtime: bool,
    pub overtime_quantity: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkRecordInput {
    pub employee_id: Option<String>,
    pub work_date: Option<NaiveDate>,
    pub work_type_id: Option<String>,
    pub work_item_id: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub is_overtime: Option<bool>,
    pub overtime_quantity: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkRecordFilters {
    pub employee_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub work_type_id: Option<String>,
    pub status: Option<WorkRecordStatus>,
}
