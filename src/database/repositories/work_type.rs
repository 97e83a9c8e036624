use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    CalculationType, OvertimeConfig, OvertimeConfigInput, WorkType, WorkTypeInput,
};
use crate::error::AppError;

const WORK_TYPE_COLUMNS: &str =
    "id, name, department, calculation_type, unit_price, created_at, updated_at";
const OVERTIME_CONFIG_COLUMNS: &str =
    "id, work_type_id, overtime_price_per_weld, overtime_percentage, created_at, updated_at";

#[derive(Clone)]
pub struct WorkTypeRepository {
    pool: SqlitePool,
}

impl WorkTypeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: WorkTypeInput) -> Result<WorkType> {
        // (name, department) must stay unique, name compared
        // case-insensitively.
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM work_types WHERE LOWER(name) = LOWER(?) AND department = ?",
        )
        .bind(&input.name)
        .bind(&input.department)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(AppError::conflict(format!(
                "Work type \"{}\" already exists in department \"{}\"",
                input.name, input.department
            ))
            .into());
        }

        let now = Utc::now();
        let work_type = sqlx::query_as::<_, WorkType>(&format!(
            r#"
            INSERT INTO work_types (id, name, department, calculation_type, unit_price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {WORK_TYPE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(input.name)
        .bind(input.department)
        .bind(input.calculation_type)
        .bind(input.unit_price)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(work_type)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<WorkType>> {
        let work_type = sqlx::query_as::<_, WorkType>(&format!(
            "SELECT {WORK_TYPE_COLUMNS} FROM work_types WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work_type)
    }

    /// Create or update the overtime config for a work type. The column
    /// that does not apply to the work type's calculation mode is forced
    /// to zero; daily-mode work types take no config at all.
    pub async fn upsert_overtime_config(
        &self,
        input: OvertimeConfigInput,
    ) -> Result<OvertimeConfig> {
        let work_type = self
            .get_by_id(&input.work_type_id)
            .await?
            .ok_or_else(|| AppError::not_found("Work type not found"))?;

        let (price_per_weld, percentage) = match work_type.calculation_type {
            CalculationType::WeldCount => (input.overtime_price_per_weld.unwrap_or(0.0), 0.0),
            CalculationType::Hourly => (0.0, input.overtime_percentage.unwrap_or(0.0)),
            CalculationType::Daily => {
                return Err(AppError::validation(
                    "Daily-rate work types do not support overtime configs",
                )
                .into());
            }
        };

        let now = Utc::now();
        let config = sqlx::query_as::<_, OvertimeConfig>(&format!(
            r#"
            INSERT INTO overtime_configs (id, work_type_id, overtime_price_per_weld, overtime_percentage, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (work_type_id) DO UPDATE SET
                overtime_price_per_weld = excluded.overtime_price_per_weld,
                overtime_percentage = excluded.overtime_percentage,
                updated_at = excluded.updated_at
            RETURNING {OVERTIME_CONFIG_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(work_type.id)
        .bind(price_per_weld)
        .bind(percentage)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(config)
    }

    pub async fn get_overtime_config(&self, work_type_id: &str) -> Result<Option<OvertimeConfig>> {
        let config = sqlx::query_as::<_, OvertimeConfig>(&format!(
            "SELECT {OVERTIME_CONFIG_COLUMNS} FROM overtime_configs WHERE work_type_id = ?"
        ))
        .bind(work_type_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }
}
