use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::database::repositories::{ReportFilters, ReportRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::Claims;

#[derive(Debug, Deserialize)]
pub struct WeeklyReportQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub department: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub department: Option<String>,
    pub employee_id: Option<String>,
}

pub async fn get_weekly_report(
    _claims: Claims,
    repo: web::Data<ReportRepository>,
    query: web::Query<WeeklyReportQuery>,
) -> Result<HttpResponse, AppError> {
    let (Some(year), Some(week)) = (query.year, query.week) else {
        return Err(AppError::validation("Year and week are required"));
    };

    let filters = ReportFilters {
        department: query.department.clone(),
        employee_id: query.employee_id.clone(),
    };

    let report = repo.weekly(year, week, &filters).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

pub async fn get_monthly_report(
    _claims: Claims,
    repo: web::Data<ReportRepository>,
    query: web::Query<MonthlyReportQuery>,
) -> Result<HttpResponse, AppError> {
    let (Some(year), Some(month)) = (query.year, query.month) else {
        return Err(AppError::validation("Year and month are required"));
    };

    if !(1..=12).contains(&month) {
        return Err(AppError::validation("Month must be between 1 and 12"));
    }

    let filters = ReportFilters {
        department: query.department.clone(),
        employee_id: query.employee_id.clone(),
    };

    let report = repo.monthly(year, month, &filters).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}
