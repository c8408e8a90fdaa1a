use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::settings::TaxSettings;
use crate::types::{checked_mul, checked_sub, with_metadata, ComputationOutput, Money};
use crate::TaxEngineResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealAllowanceInput {
    pub meals: u32,
    pub claimed_per_meal: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealAllowanceCheck {
    pub meals: u32,
    pub reasonable_per_meal: Money,
    pub claimed_total: Money,
    /// Portion of the claim within the reasonable amount.
    pub within_reasonable: Money,
    pub excess_per_meal: Money,
    pub excess_total: Money,
    pub exceeds_reasonable: bool,
}

/// Compare overtime meal claims with the period's reasonable amount.
pub fn check_meal_allowance(
    input: &MealAllowanceInput,
    settings: &TaxSettings,
) -> TaxEngineResult<ComputationOutput<MealAllowanceCheck>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.claimed_per_meal < Decimal::ZERO {
        return Err(TaxEngineError::InvalidInput {
            field: "claimed_per_meal".into(),
            reason: "Claimed amount per meal cannot be negative".into(),
        });
    }

    let meals = Decimal::from(input.meals);
    let reasonable = settings.meal_allowance;
    let excess_per_meal =
        checked_sub(input.claimed_per_meal, reasonable, "meal_allowance")?.max(Decimal::ZERO);
    let claimed_total = checked_mul(input.claimed_per_meal, meals, "claimed_per_meal")?;
    let excess_total = checked_mul(excess_per_meal, meals, "claimed_per_meal")?;
    let exceeds_reasonable = excess_total > Decimal::ZERO;

    if exceeds_reasonable {
        warnings.push(format!(
            "Claim exceeds the reasonable amount of {reasonable} per meal by {excess_per_meal}; \
             the excess needs written evidence."
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Overtime meal allowance: claims compared per meal with the reasonable amount",
        &serde_json::json!({
            "period": settings.period.to_string(),
            "meals": input.meals,
            "reasonable_per_meal": reasonable.to_string(),
        }),
        warnings,
        elapsed,
        MealAllowanceCheck {
            meals: input.meals,
            reasonable_per_meal: reasonable,
            claimed_total,
            within_reasonable: claimed_total - excess_total,
            excess_per_meal,
            excess_total,
            exceeds_reasonable,
        },
    ))
}
