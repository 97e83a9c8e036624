use crate::database::models::{CalculationType, OvertimeConfig, WorkItem, WorkType};
use crate::error::AppError;

/// Everything the calculator needs, already resolved by the caller. The
/// function itself performs no I/O, so the same inputs always price to the
/// same snapshot.
#[derive(Debug)]
pub struct PricingInput<'a> {
    pub work_type: &'a WorkType,
    pub work_item: Option<&'a WorkItem>,
    pub overtime_config: Option<&'a OvertimeConfig>,
    pub quantity: f64,
    pub unit_price_override: Option<f64>,
    pub is_overtime: bool,
    pub overtime_quantity: Option<f64>,
    pub overtime_hours: Option<f64>,
}

/// The snapshot stored on the work record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub unit_price: f64,
    pub total_amount: f64,
}

pub fn compute(input: &PricingInput) -> Result<Pricing, AppError> {
    match input.work_type.calculation_type {
        CalculationType::WeldCount => {
            let work_item = input.work_item.ok_or_else(|| {
                AppError::validation("Work item is required for weld count calculation")
            })?;

            let base = input.quantity * work_item.welds_per_item * work_item.price_per_weld;

            let overtime_quantity = input.overtime_quantity.unwrap_or(0.0);
            let overtime_price = input
                .overtime_config
                .map(|c| c.overtime_price_per_weld)
                .unwrap_or(0.0);
            let overtime = if input.is_overtime && overtime_quantity > 0.0 && overtime_price > 0.0 {
                overtime_quantity
                    * work_item.welds_per_item
                    * (work_item.price_per_weld + overtime_price)
            } else {
                0.0
            };

            Ok(Pricing {
                unit_price: work_item.price_per_weld,
                total_amount: base + overtime,
            })
        }
        CalculationType::Hourly => {
            let unit_price = input
                .unit_price_override
                .unwrap_or(input.work_type.unit_price);
            let base = input.quantity * unit_price;

            let overtime_hours = input.overtime_hours.unwrap_or(0.0);
            let percentage = input
                .overtime_config
                .map(|c| c.overtime_percentage)
                .unwrap_or(0.0);
            let overtime = if input.is_overtime && overtime_hours > 0.0 && percentage > 0.0 {
                overtime_hours * unit_price * (1.0 + percentage / 100.0)
            } else {
                0.0
            };

            Ok(Pricing {
                unit_price,
                total_amount: base + overtime,
            })
        }
        CalculationType::Daily => {
            let unit_price = input
                .unit_price_override
                .unwrap_or(input.work_type.unit_price);

            Ok(Pricing {
                unit_price,
                total_amount: input.quantity * unit_price,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn work_type(calculation_type: CalculationType, unit_price: f64) -> WorkType {
        let now = Utc::now();
        WorkType {
            id: "wt-1".to_string(),
            name: "Test type".to_string(),
            department: "Xưởng hàn".to_string(),
            calculation_type,
            unit_price,
            created_at: now,
            updated_at: now,
        }
    }

    fn work_item(price_per_weld: f64, welds_per_item: f64) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id: "wi-1".to_string(),
            name: "Khung A".to_string(),
            difficulty_level: "medium".to_string(),
            price_per_weld,
            total_quantity: 1000.0,
            welds_per_item,
            status: Default::default(),
            estimated_delivery_date: None,
            weight_kg: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn overtime_config(price_per_weld: f64, percentage: f64) -> OvertimeConfig {
        let now = Utc::now();
        OvertimeConfig {
            id: "oc-1".to_string(),
            work_type_id: "wt-1".to_string(),
            overtime_price_per_weld: price_per_weld,
            overtime_percentage: percentage,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn weld_count_is_quantity_times_welds_times_price() {
        let wt = work_type(CalculationType::WeldCount, 0.0);
        let wi = work_item(1000.0, 2.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: Some(&wi),
            overtime_config: None,
            quantity: 10.0,
            unit_price_override: None,
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
        })
        .unwrap();

        assert_eq!(pricing.unit_price, 1000.0);
        assert_eq!(pricing.total_amount, 20_000.0);
    }

    #[test]
    fn weld_count_overtime_adds_surcharged_welds() {
        let wt = work_type(CalculationType::WeldCount, 0.0);
        let wi = work_item(1000.0, 2.0);
        let cfg = overtime_config(500.0, 0.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: Some(&wi),
            overtime_config: Some(&cfg),
            quantity: 10.0,
            unit_price_override: None,
            is_overtime: true,
            overtime_quantity: Some(4.0),
            overtime_hours: None,
        })
        .unwrap();

        // 10×2×1000 + 4×2×(1000+500)
        assert_eq!(pricing.total_amount, 32_000.0);
    }

    #[test]
    fn weld_count_overtime_ignored_without_config() {
        let wt = work_type(CalculationType::WeldCount, 0.0);
        let wi = work_item(1000.0, 2.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: Some(&wi),
            overtime_config: None,
            quantity: 10.0,
            unit_price_override: None,
            is_overtime: true,
            overtime_quantity: Some(4.0),
            overtime_hours: None,
        })
        .unwrap();

        assert_eq!(pricing.total_amount, 20_000.0);
    }

    #[test]
    fn weld_count_without_item_is_rejected() {
        let wt = work_type(CalculationType::WeldCount, 0.0);
        let err = compute(&PricingInput {
            work_type: &wt,
            work_item: None,
            overtime_config: None,
            quantity: 1.0,
            unit_price_override: None,
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
        })
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn hourly_defaults_to_work_type_rate() {
        let wt = work_type(CalculationType::Hourly, 50_000.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: None,
            overtime_config: None,
            quantity: 8.0,
            unit_price_override: None,
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
        })
        .unwrap();

        assert_eq!(pricing.unit_price, 50_000.0);
        assert_eq!(pricing.total_amount, 400_000.0);
    }

    #[test]
    fn hourly_override_takes_precedence() {
        let wt = work_type(CalculationType::Hourly, 50_000.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: None,
            overtime_config: None,
            quantity: 8.0,
            unit_price_override: Some(60_000.0),
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
        })
        .unwrap();

        assert_eq!(pricing.unit_price, 60_000.0);
        assert_eq!(pricing.total_amount, 480_000.0);
    }

    #[test]
    fn hourly_overtime_applies_percentage_uplift() {
        let wt = work_type(CalculationType::Hourly, 50_000.0);
        let cfg = overtime_config(0.0, 50.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: None,
            overtime_config: Some(&cfg),
            quantity: 8.0,
            unit_price_override: None,
            is_overtime: true,
            overtime_quantity: None,
            overtime_hours: Some(2.0),
        })
        .unwrap();

        // 8×50000 + 2×50000×1.5
        assert_eq!(pricing.total_amount, 550_000.0);
    }

    #[test]
    fn daily_never_surcharges_overtime() {
        let wt = work_type(CalculationType::Daily, 300_000.0);
        let pricing = compute(&PricingInput {
            work_type: &wt,
            work_item: None,
            overtime_config: None,
            quantity: 2.0,
            unit_price_override: None,
            is_overtime: true,
            overtime_quantity: None,
            overtime_hours: Some(3.0),
        })
        .unwrap();

        assert_eq!(pricing.total_amount, 600_000.0);
    }

    #[test]
    fn recompute_is_exact_over_repeated_runs() {
        let wt = work_type(CalculationType::WeldCount, 0.0);
        let wi = work_item(1000.0, 2.0);
        let input = PricingInput {
            work_type: &wt,
            work_item: Some(&wi),
            overtime_config: None,
            quantity: 10.0,
            unit_price_override: None,
            is_overtime: false,
            overtime_quantity: None,
            overtime_hours: None,
        };

        let first = compute(&input).unwrap();
        for _ in 0..100 {
            assert_eq!(compute(&input).unwrap(), first);
        }
    }
}
