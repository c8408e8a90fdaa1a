use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use tax_position_core::records::{deductions_by_category, DeductionItem};
use tax_position_core::safety_check::benchmarks::SafetyCheckConfig;
use tax_position_core::safety_check::engine::{self, SafetyCheckInput};
use tax_position_core::types::checked_add;

use crate::input;

/// Arguments for the deduction safety check
#[derive(Args)]
pub struct SafetyCheckArgs {
    /// Path to JSON file with category totals and/or deduction records
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a benchmark table JSON file, overriding an embedded `config`
    #[arg(long)]
    pub benchmarks: Option<String>,

    /// Occupation code, overriding the request's occupation
    #[arg(long)]
    pub occupation: Option<String>,
}

#[derive(Deserialize)]
struct SafetyCheckRequest {
    #[serde(flatten)]
    check: SafetyCheckInput,
    /// Raw records, rolled into `deductions_by_category`
    #[serde(default)]
    deductions: Vec<DeductionItem>,
    #[serde(default)]
    config: Option<SafetyCheckConfig>,
}

pub fn run_safety_check(args: SafetyCheckArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SafetyCheckRequest = input::read_request(args.input.as_deref(), "safety check")?;

    let config = match (args.benchmarks.as_deref(), request.config) {
        (Some(path), _) => input::file::read_json::<SafetyCheckConfig>(path)?,
        (None, Some(config)) => config,
        (None, None) => {
            return Err("a benchmark table is required: pass --benchmarks <file.json> \
                        or embed `config` in the request"
                .into())
        }
    };

    let mut check = request.check;
    for (category, amount) in deductions_by_category(&request.deductions)? {
        let total = check
            .deductions_by_category
            .entry(category)
            .or_insert(Decimal::ZERO);
        *total = checked_add(*total, amount, "deductions")?;
    }
    if args.occupation.is_some() {
        check.occupation = args.occupation;
    }

    let result = engine::evaluate(&check, &config)?;
    Ok(serde_json::to_value(result)?)
}
