use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use payroll_be::database::{
    init_database,
    repositories::{
        EmployeeRepository, MonthlySalaryRepository, ReportRepository, WorkItemRepository,
        WorkRecordRepository, WorkTypeRepository,
    },
};
use payroll_be::routes;
use payroll_be::services::{SalaryService, WorkRecordService};
use payroll_be::Config;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Payroll API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting Payroll API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories and services; repositories are constructed
    // once here and handed to actix as shared data.
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

    let config_data = web::Data::new(config.clone());
    let work_record_repo_data = web::Data::new(work_record_repository);
    let salary_repo_data = web::Data::new(salary_repository);
    let report_repo_data = web::Data::new(report_repository);
    let work_record_service_data = web::Data::new(work_record_service);
    let salary_service_data = web::Data::new(salary_service);

    let server_address = config.server_address();
    println!("🌐 Listening on http://{}", server_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(config_data.clone())
            .app_data(work_record_repo_data.clone())
            .app_data(salary_repo_data.clone())
            .app_data(report_repo_data.clone())
            .app_data(work_record_service_data.clone())
            .app_data(salary_service_data.clone())
            .service(hello)
            .service(health)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
