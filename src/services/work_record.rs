use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{
    CalculationType, CreateWorkRecordInput, UpdateWorkRecordInput, WorkItem, WorkRecord,
    WorkRecordStatus, WorkType,
};
use crate::database::repositories::{
    WorkItemRepository, WorkRecordRepository, WorkTypeRepository,
};
use crate::error::AppError;
use crate::services::pricing::{self, PricingInput};

const MAX_HOURS_PER_DAY: f64 = 24.0;

/// Orchestrates work-record writes: validation, snapshot pricing, and the
/// derived-status recompute on the touched work items.
#[derive(Clone)]
pub struct WorkRecordService {
    work_records: WorkRecordRepository,
    work_types: WorkTypeRepository,
    work_items: WorkItemRepository,
}

impl WorkRecordService {
    pub fn new(
        work_records: WorkRecordRepository,
        work_types: WorkTypeRepository,
        work_items: WorkItemRepository,
    ) -> Self {
        Self {
            work_records,
            work_types,
            work_items,
        }
    }

    pub async fn create(&self, input: CreateWorkRecordInput, actor_id: &str) -> Result<WorkRecord> {
        if input.quantity <= 0.0 {
            return Err(AppError::validation("Quantity must be greater than 0").into());
        }

        let work_type = self
            .work_types
            .get_by_id(&input.work_type_id)
            .await?
            .ok_or_else(|| AppError::not_found("Work type not found"))?;

        let (overtime_quantity, overtime_hours) = validate_overtime_fields(
            &work_type,
            input.is_overtime,
            input.overtime_quantity,
            input.overtime_hours,
        )?;

        let work_item = self
            .resolve_work_item(&work_type, input.work_item_id.as_deref())
            .await?;

        if let Some(item) = &work_item {
            self.check_item_target(item, input.quantity, None).await?;
        }

        if work_type.calculation_type == CalculationType::Hourly {
            let already = self
                .work_records
                .total_hours_in_day(&input.employee_id, input.work_date, None)
                .await?;
            let added = input.quantity + overtime_hours.unwrap_or(0.0);
            if already + added > MAX_HOURS_PER_DAY {
                return Err(AppError::validation(format!(
                    "Total hours for {} would exceed 24h in a day",
                    input.work_date
                ))
                .into());
            }
        }

        let overtime_config = self
            .work_types
            .get_overtime_config(&work_type.id)
            .await?;

        let pricing = pricing::compute(&PricingInput {
            work_type: &work_type,
            work_item: work_item.as_ref(),
            overtime_config: overtime_config.as_ref(),
            quantity: input.quantity,
            unit_price_override: input.unit_price,
            is_overtime: input.is_overtime,
            overtime_quantity,
            overtime_hours,
        })?;

        let now = Utc::now();
        let record = WorkRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: input.employee_id,
            work_date: input.work_date,
            work_type_id: work_type.id.clone(),
            work_item_id: work_item.as_ref().map(|i| i.id.clone()),
            quantity: input.quantity,
            unit_price: pricing.unit_price,
            total_amount: pricing.total_amount,
            is_overtime: input.is_overtime,
            overtime_quantity,
            overtime_hours,
            status: WorkRecordStatus::New,
            notes: input.notes,
            created_by: actor_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        let record = self.work_records.insert(&record).await?;

        if let Some(item) = &work_item {
            self.work_items.recompute_status(&item.id).await?;
        }

        Ok(record)
    }

    pub async fn update(&self, id: &str, patch: UpdateWorkRecordInput) -> Result<WorkRecord> {
        let existing = self
            .work_records
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Work record not found"))?;

        // Merge the patch onto the stored values, then re-derive the
        // snapshot from the merged view.
        let employee_id = patch.employee_id.unwrap_or(existing.employee_id.clone());
        let work_date = patch.work_date.unwrap_or(existing.work_date);
        let work_type_id = patch
            .work_type_id
            .clone()
            .unwrap_or(existing.work_type_id.clone());
        let work_item_id = patch.work_item_id.or(existing.work_item_id.clone());
        let quantity = patch.quantity.unwrap_or(existing.quantity);
        let is_overtime = patch.is_overtime.unwrap_or(existing.is_overtime);
        let notes = patch.notes.or(existing.notes.clone());

        if quantity <= 0.0 {
            return Err(AppError::validation("Quantity must be greater than 0").into());
        }

        let work_type = self
            .work_types
            .get_by_id(&work_type_id)
            .await?
            .ok_or_else(|| AppError::not_found("Work type not found"))?;

        let (overtime_quantity, overtime_hours) = validate_overtime_fields(
            &work_type,
            is_overtime,
            patch.overtime_quantity.or(existing.overtime_quantity),
            patch.overtime_hours.or(existing.overtime_hours),
        )?;

        let work_item = self
            .resolve_work_item(&work_type, work_item_id.as_deref())
            .await?;

        if let Some(item) = &work_item {
            self.check_item_target(item, quantity, Some(id)).await?;
        }

        if work_type.calculation_type == CalculationType::Hourly {
            let already = self
                .work_records
                .total_hours_in_day(&employee_id, work_date, Some(id))
                .await?;
            let added = quantity + overtime_hours.unwrap_or(0.0);
            if already + added > MAX_HOURS_PER_DAY {
                return Err(AppError::validation(format!(
                    "Total hours for {work_date} would exceed 24h in a day"
                ))
                .into());
            }
        }

        // Keep the stored snapshot unless the edit changes what it was
        // derived from: an explicit override wins, a work-type switch
        // re-snapshots from the new type's rate.
        let unit_price_override = match patch.unit_price {
            Some(price) => Some(price),
            None if work_type.id == existing.work_type_id => Some(existing.unit_price),
            None => None,
        };

        let overtime_config = self
            .work_types
            .get_overtime_config(&work_type.id)
            .await?;

        let pricing = pricing::compute(&PricingInput {
            work_type: &work_type,
            work_item: work_item.as_ref(),
            overtime_config: overtime_config.as_ref(),
            quantity,
            unit_price_override,
            is_overtime,
            overtime_quantity,
            overtime_hours,
        })?;

        let merged = WorkRecord {
            id: existing.id.clone(),
            employee_id,
            work_date,
            work_type_id: work_type.id.clone(),
            work_item_id: work_item.as_ref().map(|i| i.id.clone()),
            quantity,
            unit_price: pricing.unit_price,
            total_amount: pricing.total_amount,
            is_overtime,
            overtime_quantity,
            overtime_hours,
            status: existing.status,
            notes,
            created_by: existing.created_by.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let updated = self
            .work_records
            .update(&merged)
            .await?
            .ok_or_else(|| AppError::not_found("Work record not found"))?;

        // Both the previous and the new item can change status when a
        // record moves between items.
        if let Some(old_item_id) = &existing.work_item_id {
            self.work_items.recompute_status(old_item_id).await?;
        }
        if let Some(new_item_id) = &updated.work_item_id {
            if existing.work_item_id.as_deref() != Some(new_item_id) {
                self.work_items.recompute_status(new_item_id).await?;
            }
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let existing = self
            .work_records
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Work record not found"))?;

        self.work_records.delete(id).await?;

        if let Some(work_item_id) = &existing.work_item_id {
            self.work_items.recompute_status(work_item_id).await?;
        }

        Ok(())
    }

    async fn resolve_work_item(
        &self,
        work_type: &WorkType,
        work_item_id: Option<&str>,
    ) -> Result<Option<WorkItem>> {
        if work_type.calculation_type != CalculationType::WeldCount {
            return Ok(None);
        }

        let work_item_id = work_item_id.ok_or_else(|| {
            AppError::validation("Work item is required for weld count calculation")
        })?;

        let work_item = self
            .work_items
            .get_by_id(work_item_id)
            .await?
            .ok_or_else(|| AppError::not_found("Work item not found"))?;

        Ok(Some(work_item))
    }

    async fn check_item_target(
        &self,
        item: &WorkItem,
        quantity: f64,
        exclude_record_id: Option<&str>,
    ) -> Result<()> {
        let made = self
            .work_records
            .total_quantity_made(&item.id, exclude_record_id)
            .await?;

        if made + quantity > item.total_quantity {
            return Err(AppError::validation(format!(
                "Quantity would exceed the production target for \"{}\" ({} of {} already recorded)",
                item.name, made, item.total_quantity
            ))
            .into());
        }

        Ok(())
    }
}

/// Exactly one overtime field may carry a value, and it must match the work
/// type's calculation mode. Returns the normalized pair.
fn validate_overtime_fields(
    work_type: &WorkType,
    is_overtime: bool,
    overtime_quantity: Option<f64>,
    overtime_hours: Option<f64>,
) -> Result<(Option<f64>, Option<f64>), AppError> {
    if !is_overtime {
        return Ok((None, None));
    }

    match work_type.calculation_type {
        CalculationType::WeldCount => {
            if overtime_hours.is_some() {
                return Err(AppError::validation(
                    "Overtime hours do not apply to weld count work types",
                ));
            }
            match overtime_quantity {
                Some(quantity) if quantity > 0.0 => Ok((Some(quantity), None)),
                _ => Err(AppError::validation(
                    "Overtime quantity is required and must be greater than 0",
                )),
            }
        }
        CalculationType::Hourly => {
            if overtime_quantity.is_some() {
                return Err(AppError::validation(
                    "Overtime quantity does not apply to hourly work types",
                ));
            }
            match overtime_hours {
                Some(hours) if hours > 0.0 => Ok((None, Some(hours))),
                _ => Err(AppError::validation(
                    "Overtime hours are required and must be greater than 0",
                )),
            }
        }
        CalculationType::Daily => Err(AppError::validation(
            "Daily-rate work types do not support overtime",
        )),
    }
}
