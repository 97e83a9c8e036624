use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::database::models::{
    CreateWorkRecordInput, UpdateWorkRecordInput, WorkRecordFilters, WorkRecordStatus,
};
use crate::database::repositories::WorkRecordRepository;
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, Paginated, default_page, default_page_size};
use crate::services::{Claims, WorkRecordService};

#[derive(Debug, Deserialize)]
pub struct WorkRecordQuery {
    pub employee_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub work_type_id: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub employee_id: String,
    pub year: i32,
    pub month: u32,
}

/// Log a unit of work. The caller never supplies amounts; pricing is
/// snapshotted server-side.
pub async fn create_work_record(
    claims: Claims,
    service: web::Data<WorkRecordService>,
    input: web::Json<CreateWorkRecordInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let record = service.create(input.into_inner(), claims.user_id()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        Some(record),
        "Work record created successfully",
    )))
}

pub async fn get_work_records(
    _claims: Claims,
    repo: web::Data<WorkRecordRepository>,
    query: web::Query<WorkRecordQuery>,
) -> Result<HttpResponse, AppError> {
    let status = match &query.status {
        Some(status_str) => Some(
            status_str
                .parse::<WorkRecordStatus>()
                .map_err(|_| AppError::validation("Invalid work record status"))?,
        ),
        None => None,
    };

    let filters = WorkRecordFilters {
        employee_id: query.employee_id.clone(),
        date_from: query.date_from,
        date_to: query.date_to,
        work_type_id: query.work_type_id.clone(),
        status,
    };

    let (records, total) = repo.list(&filters, query.page, query.page_size).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(Paginated::new(
        records,
        total,
        query.page,
        query.page_size,
    ))))
}

pub async fn get_work_record(
    _claims: Claims,
    repo: web::Data<WorkRecordRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record = repo
        .get_by_id(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Work record not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn update_work_record(
    claims: Claims,
    service: web::Data<WorkRecordService>,
    path: web::Path<String>,
    input: web::Json<UpdateWorkRecordInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let record = service
        .update(&path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(record),
        "Work record updated successfully",
    )))
}

pub async fn delete_work_record(
    claims: Claims,
    service: web::Data<WorkRecordService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    service.delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Work record deleted successfully",
    )))
}

/// Records for one employee in one calendar month, the aggregator's own
/// selection exposed for review screens.
pub async fn get_work_records_by_month(
    _claims: Claims,
    repo: web::Data<WorkRecordRepository>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    if !(1..=12).contains(&query.month) {
        return Err(AppError::validation("Month must be between 1 and 12"));
    }

    let records = repo
        .get_by_employee_and_month(&query.employee_id, query.year, query.month)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}

/// Audit trail: the records snapshotted under one settlement.
pub async fn get_work_records_by_salary(
    _claims: Claims,
    repo: web::Data<WorkRecordRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let records = repo.get_by_monthly_salary_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(records)))
}
