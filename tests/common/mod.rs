#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use payroll_be::Config;
use payroll_be::database::init_database;
use payroll_be::database::models::*;
use payroll_be::database::repositories::{
    EmployeeRepository, MonthlySalaryRepository, ReportRepository, WorkItemRepository,
    WorkRecordRepository, WorkTypeRepository,
};
use payroll_be::services::{Claims, SalaryService, UserRole, WorkRecordService};

pub const TEST_ACTOR: &str = "test-admin";

// Test database wrapper
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

/// Repositories and services wired over one isolated test database.
pub struct TestContext {
    pub db: TestDb,
    pub employees: EmployeeRepository,
    pub work_types: WorkTypeRepository,
    pub work_items: WorkItemRepository,
    pub work_records: WorkRecordRepository,
    pub salaries: MonthlySalaryRepository,
    pub reports: ReportRepository,
    pub record_service: WorkRecordService,
    pub salary_service: SalaryService,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let pool = db.pool.clone();

        let employees = EmployeeRepository::new(pool.clone());
        let work_types = WorkTypeRepository::new(pool.clone());
        let work_items = WorkItemRepository::new(pool.clone());
        let work_records = WorkRecordRepository::new(pool.clone());
        let salaries = MonthlySalaryRepository::new(pool.clone());
        let reports = ReportRepository::new(pool.clone());

        let record_service = WorkRecordService::new(
            work_records.clone(),
            work_types.clone(),
            work_items.clone(),
        );
        let salary_service = SalaryService::new(
            salaries.clone(),
            work_records.clone(),
            employees.clone(),
        );

        Ok(TestContext {
            db,
            employees,
            work_types,
            work_items,
            work_records,
            salaries,
            reports,
            record_service,
            salary_service,
        })
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
    }
}

pub fn admin_token(config: &Config) -> String {
    Claims::new(
        "test-admin".to_string(),
        "admin".to_string(),
        UserRole::Admin,
        1,
    )
    .to_token(&config.jwt_secret)
    .expect("Failed to create test token")
}

pub fn employee_token(config: &Config) -> String {
    Claims::new(
        "test-employee".to_string(),
        "employee".to_string(),
        UserRole::Employee,
        1,
    )
    .to_token(&config.jwt_secret)
    .expect("Failed to create test token")
}

pub async fn create_employee(
    ctx: &TestContext,
    department: &str,
    salary: Option<f64>,
) -> Employee {
    ctx.employees
        .create(EmployeeInput {
            employee_code: format!("NV-{}", &Uuid::new_v4().to_string()[..8]),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            department: department.to_string(),
            salary,
            status: None,
        })
        .await
        .expect("Failed to create test employee")
}

pub async fn create_work_type(
    ctx: &TestContext,
    calculation_type: CalculationType,
    department: &str,
    unit_price: f64,
) -> WorkType {
    ctx.work_types
        .create(WorkTypeInput {
            name: format!("{} {}", calculation_type, &Uuid::new_v4().to_string()[..8]),
            department: department.to_string(),
            calculation_type,
            unit_price,
        })
        .await
        .expect("Failed to create test work type")
}

pub async fn create_work_item(
    ctx: &TestContext,
    price_per_weld: f64,
    welds_per_item: f64,
    total_quantity: f64,
) -> WorkItem {
    ctx.work_items
        .create(WorkItemInput {
            name: format!("Khung {}", &Uuid::new_v4().to_string()[..8]),
            difficulty_level: "medium".to_string(),
            price_per_weld,
            welds_per_item,
            total_quantity,
            estimated_delivery_date: None,
            weight_kg: None,
        })
        .await
        .expect("Failed to create test work item")
}

/// Log a priced weld-count record through the service path.
pub async fn log_weld_record(
    ctx: &TestContext,
    employee: &Employee,
    work_type: &WorkType,
    work_item: &WorkItem,
    date: &str,
    quantity: f64,
) -> WorkRecord {
    ctx.record_service
        .create(
            CreateWorkRecordInput {
                employee_id: employee.id.clone(),
                work_date: parse_date(date),
                work_type_id: work_type.id.clone(),
                work_item_id: Some(work_item.id.clone()),
                quantity,
                unit_price: None,
                is_overtime: false,
                overtime_quantity: None,
                overtime_hours: None,
                notes: None,
            },
            TEST_ACTOR,
        )
        .await
        .expect("Failed to create test work record")
}

pub fn parse_date(date: &str) -> NaiveDate {
    date.parse().expect("Invalid test date")
}

/// Insert a settlement row directly, bypassing the service guards. Used to
/// reproduce legacy states such as several coexisting drafts for one
/// period.
pub async fn insert_settlement_raw(
    pool: &SqlitePool,
    employee_id: &str,
    year: i32,
    month: i32,
    total_work_days: i32,
    total_amount: f64,
    allowances: f64,
    status: SettlementStatus,
    record_ids: &[String],
) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO monthly_salaries (id, employee_id, year, month, total_work_days, total_amount, allowances, status, calculated_at, paid_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .bind(total_work_days)
    .bind(total_amount)
    .bind(allowances)
    .bind(status)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .expect("Failed to insert raw settlement");

    for record_id in record_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO monthly_salary_work_records (monthly_salary_id, work_record_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(&id)
        .bind(record_id)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to insert raw junction row");
    }

    id
}
