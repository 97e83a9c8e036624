use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum WorkItemStatus {
        #[serde(rename = "Tạo mới")]
        New => "Tạo mới",
        #[serde(rename = "Đang sản xuất")]
        InProgress => "Đang sản xuất",
        #[serde(rename = "Hoàn thành")]
        Done => "Hoàn thành",
    }
}

impl Default for WorkItemStatus {
    fn default() -> Self {
        WorkItemStatus::New
    }
}

/// A produced good priced per weld, with a production target. `status` is
/// derived from recorded quantity versus `total_quantity` and is only ever
/// written through the recompute path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub name: String,
    pub difficulty_level: String,
    pub price_per_weld: f64,
    pub total_quantity: f64,
    pub welds_per_item: f64,
    pub status: WorkItemStatus,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemInput {
    pub name: String,
    pub difficulty_level: String,
    pub price_per_weld: f64,
    pub total_quantity: f64,
    pub welds_per_item: f64,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
}
