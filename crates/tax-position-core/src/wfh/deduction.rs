use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::hours::validate_wfh_hours;
use crate::error::TaxEngineError;
use crate::settings::{wfh_rate, TaxSettings};
use crate::types::{
    checked_mul, checked_sum, lenient_amount, percent_of, with_metadata, ComputationOutput, Money,
    Percentage,
};
use crate::TaxEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WfhMethod {
    FixedRate,
    ActualCost,
}

/// Running costs for the actual-cost method, before work-use apportionment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActualCosts {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub electricity: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub internet: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cleaning: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub phone_usage: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub stationery: Money,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub furniture_depreciation: Money,
}

impl ActualCosts {
    /// Cost lines in presentation order.
    fn lines(&self) -> [(&'static str, Money); 6] {
        [
            ("Electricity", self.electricity),
            ("Internet", self.internet),
            ("Phone", self.phone_usage),
            ("Cleaning", self.cleaning),
            ("Stationery", self.stationery),
            ("Furniture depreciation", self.furniture_depreciation),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WfhInput {
    pub method: WfhMethod,
    #[serde(default)]
    pub total_hours: i64,
    #[serde(default)]
    pub actual_costs: Option<ActualCosts>,
    #[serde(default)]
    pub work_use_percentage: Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub label: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfhResult {
    pub method: WfhMethod,
    pub total_hours: i64,
    pub rate_per_hour: Money,
    pub total_deduction: Money,
    pub breakdown: Vec<BreakdownLine>,
}

impl WfhResult {
    fn zero(method: WfhMethod, total_hours: i64) -> Self {
        Self {
            method,
            total_hours,
            rate_per_hour: Decimal::ZERO,
            total_deduction: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// Fixed-rate method: `rate_per_hour * hours`.
///
/// Hours are validated first; a rejected figure is an `InvalidInput` error
/// carrying the validation message. Advisory messages do not stop the
/// computation.
pub fn calculate_wfh_fixed_rate(total_hours: i64, rate_per_hour: Money) -> TaxEngineResult<WfhResult> {
    let validation = validate_wfh_hours(total_hours);
    if !validation.valid {
        return Err(TaxEngineError::InvalidInput {
            field: "total_hours".into(),
            reason: validation.message.unwrap_or_default(),
        });
    }
    if rate_per_hour < Decimal::ZERO {
        return Err(TaxEngineError::InvalidConfiguration {
            component: "wfh_fixed_rate".into(),
            reason: format!("Rate per hour cannot be negative, got {rate_per_hour}"),
        });
    }

    let total_deduction = checked_mul(rate_per_hour, Decimal::from(total_hours), "wfh_fixed_rate")?;
    Ok(WfhResult {
        method: WfhMethod::FixedRate,
        total_hours,
        rate_per_hour,
        total_deduction,
        breakdown: vec![BreakdownLine {
            label: format!("{total_hours} hours x {rate_per_hour} per hour"),
            amount: total_deduction,
        }],
    })
}

/// Actual-cost method: each running cost apportioned by work-use
/// percentage. Zero contributions are left out of the breakdown, and the
/// breakdown always sums exactly to the total.
pub fn calculate_wfh_actual_cost(
    total_hours: i64,
    costs: &ActualCosts,
    work_use_percentage: Percentage,
) -> TaxEngineResult<WfhResult> {
    if work_use_percentage < Decimal::ZERO || work_use_percentage > Decimal::ONE_HUNDRED {
        return Err(TaxEngineError::InvalidInput {
            field: "work_use_percentage".into(),
            reason: format!("Work-use percentage must be between 0 and 100, got {work_use_percentage}"),
        });
    }

    let mut breakdown: Vec<BreakdownLine> = Vec::new();
    for (label, cost) in costs.lines() {
        let amount = percent_of(cost, work_use_percentage)
            .ok_or_else(|| TaxEngineError::overflow("actual_costs"))?;
        if !amount.is_zero() {
            breakdown.push(BreakdownLine {
                label: label.to_string(),
                amount,
            });
        }
    }
    let total_deduction = checked_sum(breakdown.iter().map(|line| line.amount), "actual_costs")?;

    Ok(WfhResult {
        total_deduction,
        breakdown,
        ..WfhResult::zero(WfhMethod::ActualCost, total_hours)
    })
}

/// Dispatch on the chosen method.
///
/// The fixed rate comes from the period's settings, or the default rate when
/// none are loaded. Actual cost without cost figures yields a zero result
/// rather than an error.
pub fn calculate_wfh_deduction(
    input: &WfhInput,
    settings: Option<&TaxSettings>,
) -> TaxEngineResult<ComputationOutput<WfhResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = match input.method {
        WfhMethod::FixedRate => {
            let validation = validate_wfh_hours(input.total_hours);
            if let (true, Some(message)) = (validation.valid, validation.message) {
                warnings.push(message);
            }
            if settings.is_none() {
                warnings.push(format!(
                    "No settings loaded for the period; using default rate of {} per hour.",
                    wfh_rate(None)
                ));
            }
            calculate_wfh_fixed_rate(input.total_hours, wfh_rate(settings))?
        }
        WfhMethod::ActualCost => match &input.actual_costs {
            Some(costs) => calculate_wfh_actual_cost(input.total_hours, costs, input.work_use_percentage)?,
            None => {
                warnings.push("No actual costs supplied; deduction is zero.".into());
                WfhResult::zero(WfhMethod::ActualCost, input.total_hours)
            }
        },
    };

    tracing::debug!(
        method = ?result.method,
        hours = result.total_hours,
        total = %result.total_deduction,
        "computed WFH deduction"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        match input.method {
            WfhMethod::FixedRate => "WFH fixed-rate method: hours worked from home x rate per hour",
            WfhMethod::ActualCost => {
                "WFH actual-cost method: running costs apportioned by work-use percentage"
            }
        },
        &serde_json::json!({
            "method": input.method,
            "total_hours": input.total_hours,
            "work_use_percentage": input.work_use_percentage.to_string(),
            "rate_per_hour": wfh_rate(settings).to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}
