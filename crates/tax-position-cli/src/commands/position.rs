use clap::Args;
use serde_json::Value;

use tax_position_core::position::tax_position::{self, PositionInput};

use super::resolve_settings;
use crate::input;

/// Arguments for the tax position calculation
#[derive(Args)]
pub struct PositionArgs {
    /// Path to JSON file with period, records and (optionally) settings
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a TaxSettings JSON file, overriding embedded settings
    #[arg(long)]
    pub settings: Option<String>,
}

pub fn run_position(args: PositionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: PositionInput = input::read_request(args.input.as_deref(), "tax position")?;
    request.settings = resolve_settings(args.settings.as_deref(), request.settings.take())?;
    let result = tax_position::compute_position(&request)?;
    Ok(serde_json::to_value(result)?)
}
