use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use tax_position_core::allowances::meals::{self, MealAllowanceInput};
use tax_position_core::allowances::vehicle::{self, VehicleInput};
use tax_position_core::position::tax_position::{self, PositionInput};
use tax_position_core::safety_check::benchmarks::SafetyCheckConfig;
use tax_position_core::safety_check::engine::{self, SafetyCheckInput};
use tax_position_core::settings::TaxSettings;
use tax_position_core::wfh::deduction::{self, WfhInput};
use tax_position_core::wfh::hours;
use tax_position_core::TaxEngineError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn require_settings(settings: Option<TaxSettings>) -> NapiResult<TaxSettings> {
    settings.ok_or_else(|| {
        to_napi_error(TaxEngineError::SettingsNotLoaded {
            period: "(none supplied)".into(),
        })
    })
}

// ---------------------------------------------------------------------------
// Request envelopes: computation input plus the settings it reads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WfhRequest {
    #[serde(flatten)]
    wfh: WfhInput,
    #[serde(default)]
    settings: Option<TaxSettings>,
}

#[derive(Deserialize)]
struct SafetyCheckRequest {
    #[serde(flatten)]
    check: SafetyCheckInput,
    config: SafetyCheckConfig,
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

// ---------------------------------------------------------------------------
// Tax position
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_position(input_json: String) -> NapiResult<String> {
    let input: PositionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = tax_position::compute_position(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Work from home
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_wfh_deduction(input_json: String) -> NapiResult<String> {
    let request: WfhRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = deduction::calculate_wfh_deduction(&request.wfh, request.settings.as_ref())
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_wfh_hours(hours: i64) -> NapiResult<String> {
    serde_json::to_string(&hours::validate_wfh_hours(hours)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Safety check
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_safety_check(input_json: String) -> NapiResult<String> {
    let request: SafetyCheckRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = engine::evaluate(&request.check, &request.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Allowances
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_vehicle_deduction(input_json: String) -> NapiResult<String> {
    let request: VehicleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settings = require_settings(request.settings)?;
    let output =
        vehicle::calculate_vehicle_deduction(&request.vehicle, &settings).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn check_meal_allowance(input_json: String) -> NapiResult<String> {
    let request: MealAllowanceRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settings = require_settings(request.settings)?;
    let output = meals::check_meal_allowance(&request.meals, &settings).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
