mod common;

use actix_web::{App, http::StatusCode, test, web};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use payroll_be::Config;
use payroll_be::database::models::CalculationType;
use payroll_be::database::repositories::{
    EmployeeRepository, MonthlySalaryRepository, ReportRepository, WorkItemRepository,
    WorkRecordRepository, WorkTypeRepository,
};
use payroll_be::routes;
use payroll_be::services::{SalaryService, WorkRecordService};

fn build_app(
    ctx: &TestContext,
    config: &Config,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let pool = ctx.db.pool.clone();
    let employee_repository = EmployeeRepository::new(pool.clone());
    let work_type_repository = WorkTypeRepository::new(pool.clone());
    let work_item_repository = WorkItemRepository::new(pool.clone());
    let work_record_repository = WorkRecordRepository::new(pool.clone());
    let salary_repository = MonthlySalaryRepository::new(pool.clone());
    let report_repository = ReportRepository::new(pool.clone());

    let work_record_service = WorkRecordService::new(
        work_record_repository.clone(),
        work_type_repository.clone(),
        work_item_repository.clone(),
    );
    let salary_service = SalaryService::new(
        salary_repository.clone(),
        work_record_repository.clone(),
        employee_repository.clone(),
    );

    App::new()
        .app_data(web::Data::new(config.clone()))
        .app_data(web::Data::new(work_record_repository))
        .app_data(web::Data::new(salary_repository))
        .app_data(web::Data::new(report_repository))
        .app_data(web::Data::new(work_record_service))
        .app_data(web::Data::new(salary_service))
        .configure(routes::configure)
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_rt::test]
async fn requests_without_a_token_are_unauthorized() {
    let ctx = TestContext::new().await.expect("test context");
    let config = test_config();
    let app = test::init_service(build_app(&ctx, &config)).await;

    let req = test::TestRequest::get().uri("/api/v1/salaries").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn non_admins_cannot_trigger_calculations() {
    let ctx = TestContext::new().await.expect("test context");
    let config = test_config();
    let app = test::init_service(build_app(&ctx, &config)).await;
    let token = employee_token(&config);

    let employee = create_employee(&ctx, "Xưởng hàn", Some(5_000_000.0)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/salaries/calculate")
        .insert_header(bearer(&token))
        .set_json(json!({ "employeeId": employee.id, "year": 2024, "month": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn record_to_settlement_flow_over_http() {
    let ctx = TestContext::new().await.expect("test context");
    let config = test_config();
    let app = test::init_service(build_app(&ctx, &config)).await;
    let token = admin_token(&config);

    let employee = create_employee(&ctx, "Xưởng hàn", None).await;
    let work_type = create_work_type(&ctx, CalculationType::WeldCount, "Xưởng hàn", 0.0).await;
    let work_item = create_work_item(&ctx, 1000.0, 2.0, 500.0).await;

    // Log a record; the server prices it.
    let req = test::TestRequest::post()
        .uri("/api/v1/work-records")
        .insert_header(bearer(&token))
        .set_json(json!({
            "employeeId": employee.id,
            "workDate": "2024-03-04",
            "workTypeId": work_type.id,
            "workItemId": work_item.id,
            "quantity": 10.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["totalAmount"], json!(20_000.0));
    assert_eq!(body["data"]["status"], json!("new"));

    // Calculate the draft.
    let req = test::TestRequest::post()
        .uri("/api/v1/salaries/calculate")
        .insert_header(bearer(&token))
        .set_json(json!({ "employeeId": employee.id, "year": 2024, "month": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["totalAmount"], json!(20_000.0));
    assert_eq!(body["data"]["totalWorkDays"], json!(1));
    assert_eq!(body["data"]["status"], json!("Tạm tính"));
    let salary_id = body["data"]["id"].as_str().unwrap().to_string();

    // Pay it.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/salaries/{salary_id}/pay"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], json!("Thanh toán"));

    // Paying again conflicts.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/salaries/{salary_id}/pay"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Audit trail lists the snapshotted record.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/work-records/by-salary/{salary_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], json!("paid"));

    // Delete with reversal, then the settlement is gone.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/salaries/{salary_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/salaries/{salary_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn validation_errors_surface_as_bad_requests() {
    let ctx = TestContext::new().await.expect("test context");
    let config = test_config();
    let app = test::init_service(build_app(&ctx, &config)).await;
    let token = admin_token(&config);

    let employee = create_employee(&ctx, "Xưởng hàn", None).await;

    // Month outside 1..=12.
    let req = test::TestRequest::post()
        .uri("/api/v1/salaries/calculate")
        .insert_header(bearer(&token))
        .set_json(json!({ "employeeId": employee.id, "year": 2024, "month": 13 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));

    // Reports insist on their period parameters.
    let req = test::TestRequest::get()
        .uri("/api/v1/reports/monthly?year=2024")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown settlement ids are 404s.
    let req = test::TestRequest::post()
        .uri("/api/v1/salaries/does-not-exist/pay")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
