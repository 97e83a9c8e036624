use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{WorkItem, WorkItemInput, WorkItemStatus};

const WORK_ITEM_COLUMNS: &str = "id, name, difficulty_level, price_per_weld, total_quantity, welds_per_item, status, estimated_delivery_date, weight_kg, created_at, updated_at";

#[derive(Clone)]
pub struct WorkItemRepository {
    pool: SqlitePool,
}

impl WorkItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: WorkItemInput) -> Result<WorkItem> {
        let now = Utc::now();
        let work_item = sqlx::query_as::<_, WorkItem>(&format!(
            r#"
            INSERT INTO work_items (id, name, difficulty_level, price_per_weld, total_quantity, welds_per_item, status, estimated_delivery_date, weight_kg, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {WORK_ITEM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(input.name)
        .bind(input.difficulty_level)
        .bind(input.price_per_weld)
        .bind(input.total_quantity)
        .bind(input.welds_per_item)
        .bind(WorkItemStatus::New)
        .bind(input.estimated_delivery_date)
        .bind(input.weight_kg)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(work_item)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<WorkItem>> {
        let work_item = sqlx::query_as::<_, WorkItem>(&format!(
            "SELECT {WORK_ITEM_COLUMNS} FROM work_items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work_item)
    }

    /// Re-derive the item's production status from the quantity recorded
    /// against it. Called after every work-record mutation that can change
    /// the made total; the status column is never written anywhere else.
    pub async fn recompute_status(&self, work_item_id: &str) -> Result<()> {
        let Some(work_item) = self.get_by_id(work_item_id).await? else {
            return Ok(());
        };

        let quantity_made: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0.0) FROM work_records WHERE work_item_id = ?",
        )
        .bind(work_item_id)
        .fetch_one(&self.pool)
        .await?;

        let new_status = if quantity_made >= work_item.total_quantity {
            WorkItemStatus::Done
        } else if quantity_made > 0.0 {
            WorkItemStatus::InProgress
        } else {
            WorkItemStatus::New
        };

        if new_status != work_item.status {
            sqlx::query("UPDATE work_items SET status = ?, updated_at = ? WHERE id = ?")
                .bind(new_status)
                .bind(Utc::now())
                .bind(work_item_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }
}
