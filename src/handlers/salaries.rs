use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::database::models::{
    BatchCalculateInput, CalculateSalaryInput, SalaryFilters, UpdateAllowancesInput,
};
use crate::database::repositories::MonthlySalaryRepository;
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, Paginated, default_page, default_page_size};
use crate::services::{Claims, SalaryService};

#[derive(Debug, Deserialize)]
pub struct SalaryQuery {
    pub employee_id: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

pub async fn calculate_salary(
    claims: Claims,
    service: web::Data<SalaryService>,
    input: web::Json<CalculateSalaryInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let salary = service.calculate(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(salary),
        "Monthly salary calculated and saved successfully",
    )))
}

pub async fn calculate_salary_for_all(
    claims: Claims,
    service: web::Data<SalaryService>,
    input: web::Json<BatchCalculateInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let input = input.into_inner();
    let result = service.calculate_for_all(input.year, input.month).await?;

    let message = format!(
        "Calculated salaries for {}/{} employees",
        result.succeeded, result.total
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(Some(result), &message)))
}

pub async fn get_salaries(
    _claims: Claims,
    repo: web::Data<MonthlySalaryRepository>,
    query: web::Query<SalaryQuery>,
) -> Result<HttpResponse, AppError> {
    let filters = SalaryFilters {
        employee_id: query.employee_id.clone(),
        year: query.year,
        month: query.month,
    };

    let (salaries, total) = repo.list(&filters, query.page, query.page_size).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(Paginated::new(
        salaries,
        total,
        query.page,
        query.page_size,
    ))))
}

pub async fn get_salary(
    _claims: Claims,
    repo: web::Data<MonthlySalaryRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let salary = repo
        .get_response_by_id(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("Monthly salary not found"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(salary)))
}

pub async fn update_allowances(
    claims: Claims,
    service: web::Data<SalaryService>,
    path: web::Path<String>,
    input: web::Json<UpdateAllowancesInput>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let salary = service
        .update_allowances(&path.into_inner(), input.allowances)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(salary),
        "Allowances updated",
    )))
}

pub async fn pay_salary(
    claims: Claims,
    service: web::Data<SalaryService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    let salary = service.pay(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(salary),
        "Salary settled and marked as paid",
    )))
}

pub async fn delete_salary(
    claims: Claims,
    service: web::Data<SalaryService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    claims.require_admin()?;

    service.delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Monthly salary deleted",
    )))
}
