use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdown {
    pub department: String,
    pub total_amount: f64,
    pub total_work_days: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkTypeBreakdown {
    pub work_type_name: String,
    pub total_amount: f64,
    pub count: i64,
}

/// Read-only rollup shape shared by the weekly and monthly reports. A
/// period with no matching data yields the all-zero shape, never an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkReport {
    pub period: String,
    pub total_employees: i64,
    pub total_work_days: i64,
    pub total_amount: f64,
    pub by_department: Vec<DepartmentBreakdown>,
    pub by_work_type: Vec<WorkTypeBreakdown>,
}

impl WorkReport {
    pub fn empty(period: String) -> Self {
        WorkReport {
            period,
            total_employees: 0,
            total_work_days: 0,
            total_amount: 0.0,
            by_department: Vec::new(),
            by_work_type: Vec::new(),
        }
    }
}
