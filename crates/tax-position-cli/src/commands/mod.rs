pub mod allowances;
pub mod position;
pub mod safety_check;
pub mod wfh;

use tax_position_core::settings::TaxSettings;

use crate::input;

/// Settings from `--settings <file>` take precedence over any embedded in
/// the request.
pub fn resolve_settings(
    flag: Option<&str>,
    embedded: Option<TaxSettings>,
) -> Result<Option<TaxSettings>, Box<dyn std::error::Error>> {
    match flag {
        Some(path) => {
            let settings: TaxSettings = input::file::read_json(path)?;
            tracing::debug!(period = %settings.period, "using settings from --settings");
            Ok(Some(settings))
        }
        None => Ok(embedded),
    }
}
