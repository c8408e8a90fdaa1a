use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use tax_position_core::allowances::meals::{self, MealAllowanceInput};
use tax_position_core::allowances::vehicle::{self, VehicleInput};
use tax_position_core::settings::TaxSettings;
use tax_position_core::TaxEngineError;

use super::resolve_settings;
use crate::input;

/// Arguments for the cents-per-km vehicle deduction
#[derive(Args)]
pub struct VehicleArgs {
    /// Path to JSON file with business_km and optional settings
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a TaxSettings JSON file
    #[arg(long)]
    pub settings: Option<String>,

    /// Business kilometres travelled; used instead of an input file
    #[arg(long)]
    pub km: Option<u32>,
}

/// Arguments for the overtime meal allowance check
#[derive(Args)]
pub struct MealAllowanceArgs {
    /// Path to JSON file with meals, claimed_per_meal and optional settings
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a TaxSettings JSON file
    #[arg(long)]
    pub settings: Option<String>,
}

#[derive(Deserialize)]
struct VehicleRequest {
    #[serde(flatten)]
    vehicle: VehicleInput,
    #[serde(default)]
    settings: Option<TaxSettings>,
}

#[derive(Deserialize)]
struct MealAllowanceRequest {
    #[serde(flatten)]
    meals: MealAllowanceInput,
    #[serde(default)]
    settings: Option<TaxSettings>,
}

fn require_settings(settings: Option<TaxSettings>) -> Result<TaxSettings, TaxEngineError> {
    settings.ok_or_else(|| TaxEngineError::SettingsNotLoaded {
        period: "(none supplied)".into(),
    })
}

pub fn run_vehicle(args: VehicleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match (args.km, args.input.as_deref()) {
        (Some(km), None) => VehicleRequest {
            vehicle: VehicleInput { business_km: km },
            settings: None,
        },
        (_, path) => input::read_request(path, "vehicle deduction")?,
    };
    let settings = require_settings(resolve_settings(args.settings.as_deref(), request.settings)?)?;
    let result = vehicle::calculate_vehicle_deduction(&request.vehicle, &settings)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_meal_allowance(args: MealAllowanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: MealAllowanceRequest =
        input::read_request(args.input.as_deref(), "meal allowance check")?;
    let settings = require_settings(resolve_settings(args.settings.as_deref(), request.settings)?)?;
    let result = meals::check_meal_allowance(&request.meals, &settings)?;
    Ok(serde_json::to_value(result)?)
}
