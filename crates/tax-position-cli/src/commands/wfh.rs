use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use tax_position_core::settings::TaxSettings;
use tax_position_core::wfh::deduction::{self, WfhInput, WfhMethod};
use tax_position_core::wfh::hours;

use super::resolve_settings;
use crate::input;

/// Arguments for the work-from-home deduction
#[derive(Args)]
pub struct WfhArgs {
    /// Path to JSON file with a WFH request
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a TaxSettings JSON file supplying the fixed rate
    #[arg(long)]
    pub settings: Option<String>,

    /// Hours worked from home; runs the fixed-rate method without an input file
    #[arg(long, allow_hyphen_values = true)]
    pub hours: Option<i64>,
}

/// Arguments for WFH hours validation
#[derive(Args)]
pub struct WfhHoursArgs {
    /// Hours worked from home over the period
    #[arg(long, allow_hyphen_values = true)]
    pub hours: i64,
}

#[derive(Deserialize)]
struct WfhRequest {
    #[serde(flatten)]
    wfh: WfhInput,
    #[serde(default)]
    settings: Option<TaxSettings>,
}

pub fn run_wfh(args: WfhArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match (args.hours, args.input.as_deref()) {
        (Some(hours), None) => WfhRequest {
            wfh: WfhInput {
                method: WfhMethod::FixedRate,
                total_hours: hours,
                actual_costs: None,
                work_use_percentage: Default::default(),
            },
            settings: None,
        },
        (_, path) => input::read_request(path, "WFH deduction")?,
    };
    let settings = resolve_settings(args.settings.as_deref(), request.settings)?;
    let result = deduction::calculate_wfh_deduction(&request.wfh, settings.as_ref())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_wfh_hours(args: WfhHoursArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let validation = hours::validate_wfh_hours(args.hours);
    Ok(serde_json::json!({ "result": validation }))
}
