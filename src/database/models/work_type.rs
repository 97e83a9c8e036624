use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum CalculationType {
        #[serde(rename = "hourly")]
        Hourly => "hourly",
        #[serde(rename = "daily")]
        Daily => "daily",
        #[serde(rename = "weld_count")]
        WeldCount => "weld_count",
    }
}

/// A pay-calculation policy scoped to a department.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkType {
    pub id: String,
    pub name: String,
    pub department: String,
    pub calculation_type: CalculationType,
    pub unit_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTypeInput {
    pub name: String,
    pub department: String,
    pub calculation_type: CalculationType,
    pub unit_price: f64,
}

/// Per-work-type overtime surcharge. Which column carries the surcharge
/// depends on the owning work type's calculation mode; the other is kept
/// at zero.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeConfig {
    pub id: String,
    pub work_type_id: String,
    pub overtime_price_per_weld: f64,
    pub overtime_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeConfigInput {
    pub work_type_id: String,
    pub overtime_price_per_weld: Option<f64>,
    pub overtime_percentage: Option<f64>,
}
