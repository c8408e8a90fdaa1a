use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::settings::TaxSettings;
use crate::types::{percent_of, with_metadata, ComputationOutput, Money};
use crate::TaxEngineResult;

/// Business kilometres claimable per period under the cents-per-km method.
pub const MAX_CLAIMABLE_KM: u32 = 5_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInput {
    pub business_km: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleDeduction {
    pub business_km: u32,
    pub claimable_km: u32,
    pub cents_per_km: Money,
    pub deduction: Money,
}

/// Cents-per-kilometre car expense deduction, capped at
/// [`MAX_CLAIMABLE_KM`].
pub fn calculate_vehicle_deduction(
    input: &VehicleInput,
    settings: &TaxSettings,
) -> TaxEngineResult<ComputationOutput<VehicleDeduction>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cents_per_km = settings.vehicle_cents_per_km;
    if cents_per_km <= Decimal::ZERO {
        return Err(TaxEngineError::InvalidConfiguration {
            component: "vehicle_cents_per_km".into(),
            reason: format!("No cents-per-km rate configured for {}", settings.period),
        });
    }

    let claimable_km = input.business_km.min(MAX_CLAIMABLE_KM);
    if claimable_km < input.business_km {
        warnings.push(format!(
            "Business kilometres capped at {MAX_CLAIMABLE_KM}; {} km not claimable under this method.",
            input.business_km - claimable_km
        ));
    }

    let deduction = percent_of(Decimal::from(claimable_km), cents_per_km)
        .ok_or_else(|| TaxEngineError::overflow("vehicle_cents_per_km"))?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cents per kilometre: claimable business km x rate, km capped per period",
        &serde_json::json!({
            "period": settings.period.to_string(),
            "business_km": input.business_km,
            "cents_per_km": cents_per_km.to_string(),
            "max_claimable_km": MAX_CLAIMABLE_KM,
        }),
        warnings,
        elapsed,
        VehicleDeduction {
            business_km: input.business_km,
            claimable_km,
            cents_per_km,
            deduction,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::{TaxBracket, TaxBracketSchedule};
    use crate::settings::TaxPeriod;
    use rust_decimal_macros::dec;

    fn settings(cents: Decimal) -> TaxSettings {
        let schedule = TaxBracketSchedule::new(vec![TaxBracket {
            min_income: 0,
            max_income: None,
            rate: dec!(0),
            base_tax: dec!(0),
        }])
        .unwrap();
        let mut s = TaxSettings::new(TaxPeriod::new(2024), schedule);
        s.vehicle_cents_per_km = cents;
        s
    }

    #[test]
    fn test_vehicle_deduction_under_cap() {
        let out = calculate_vehicle_deduction(&VehicleInput { business_km: 1_200 }, &settings(dec!(88))).unwrap();
        assert_eq!(out.result.deduction, dec!(1056));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_vehicle_deduction_capped() {
        let out = calculate_vehicle_deduction(&VehicleInput { business_km: 7_500 }, &settings(dec!(88))).unwrap();
        assert_eq!(out.result.claimable_km, 5_000);
        assert_eq!(out.result.deduction, dec!(4400));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_vehicle_rate_beyond_decimal_range_is_invalid_input() {
        let result = calculate_vehicle_deduction(&VehicleInput { business_km: 5_000 }, &settings(Decimal::MAX));
        assert!(matches!(result, Err(TaxEngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_vehicle_requires_configured_rate() {
        assert!(matches!(
            calculate_vehicle_deduction(&VehicleInput { business_km: 10 }, &settings(dec!(0))),
            Err(TaxEngineError::InvalidConfiguration { .. })
        ));
    }
}
