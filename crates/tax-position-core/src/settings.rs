use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::brackets::{BracketFormula, TaxBracketSchedule};
use crate::error::TaxEngineError;
use crate::types::Money;
use crate::TaxEngineResult;

/// Fixed-rate WFH allowance per hour when a period has no configured rate.
pub const DEFAULT_WFH_FIXED_RATE: Money = dec!(0.67);

// ---------------------------------------------------------------------------
// TaxPeriod
// ---------------------------------------------------------------------------

/// A reporting year label such as `"2024-2025"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxPeriod {
    start_year: u16,
}

impl TaxPeriod {
    pub fn new(start_year: u16) -> Self {
        Self { start_year }
    }

    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    pub fn end_year(&self) -> u16 {
        self.start_year.saturating_add(1)
    }
}

impl fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

impl FromStr for TaxPeriod {
    type Err = TaxEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TaxEngineError::InvalidInput {
            field: "period".into(),
            reason: format!("'{s}' {reason}"),
        };

        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("must look like YYYY-YYYY"))?;
        if start.len() != 4 || end.len() != 4 {
            return Err(invalid("must use four-digit years"));
        }
        let start: u16 = start.parse().map_err(|_| invalid("has a non-numeric start year"))?;
        let end: u16 = end.parse().map_err(|_| invalid("has a non-numeric end year"))?;
        if u32::from(end) != u32::from(start) + 1 {
            return Err(invalid("must span consecutive years"));
        }
        Ok(Self::new(start))
    }
}

impl TryFrom<String> for TaxPeriod {
    type Error = TaxEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxPeriod> for String {
    fn from(period: TaxPeriod) -> Self {
        period.to_string()
    }
}

// ---------------------------------------------------------------------------
// TaxSettings
// ---------------------------------------------------------------------------

/// Rate and bracket configuration for one period. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxSettings {
    pub period: TaxPeriod,
    pub tax_brackets: TaxBracketSchedule,
    #[serde(default = "default_wfh_fixed_rate")]
    pub wfh_fixed_rate: Money,
    /// Cents per business kilometre.
    #[serde(default)]
    pub vehicle_cents_per_km: Money,
    /// Reasonable overtime meal allowance per meal.
    #[serde(default)]
    pub meal_allowance: Money,
    #[serde(default)]
    pub bracket_formula: BracketFormula,
}

fn default_wfh_fixed_rate() -> Money {
    DEFAULT_WFH_FIXED_RATE
}

impl TaxSettings {
    pub fn new(period: TaxPeriod, tax_brackets: TaxBracketSchedule) -> Self {
        Self {
            period,
            tax_brackets,
            wfh_fixed_rate: DEFAULT_WFH_FIXED_RATE,
            vehicle_cents_per_km: Decimal::ZERO,
            meal_allowance: Decimal::ZERO,
            bracket_formula: BracketFormula::default(),
        }
    }

    /// Check the scalar rates. The bracket schedule is validated when it is
    /// constructed or deserialized.
    pub fn validate(&self) -> TaxEngineResult<()> {
        let rates = [
            ("wfh_fixed_rate", self.wfh_fixed_rate),
            ("vehicle_cents_per_km", self.vehicle_cents_per_km),
            ("meal_allowance", self.meal_allowance),
        ];
        for (name, value) in rates {
            if value < Decimal::ZERO {
                return Err(TaxEngineError::InvalidConfiguration {
                    component: name.into(),
                    reason: format!("{name} cannot be negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// The per-hour WFH rate for the active period, or the default when no
/// settings are loaded.
pub fn wfh_rate(settings: Option<&TaxSettings>) -> Money {
    settings.map_or(DEFAULT_WFH_FIXED_RATE, |s| s.wfh_fixed_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse_and_display() {
        let period: TaxPeriod = "2024-2025".parse().unwrap();
        assert_eq!(period.start_year(), 2024);
        assert_eq!(period.end_year(), 2025);
        assert_eq!(period.to_string(), "2024-2025");
    }

    #[test]
    fn test_period_rejects_malformed_labels() {
        for label in ["2024", "2024-2026", "24-25", "abcd-efgh", "2025-2024", ""] {
            assert!(label.parse::<TaxPeriod>().is_err(), "{label} should be rejected");
        }
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: TaxSettings = serde_json::from_str(
            r#"{
                "period": "2024-2025",
                "tax_brackets": [
                    {"min_income": 0, "max_income": 18200, "rate": "0", "base_tax": "0"},
                    {"min_income": 18201, "max_income": null, "rate": "19", "base_tax": "0"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(settings.wfh_fixed_rate, dec!(0.67));
        assert_eq!(settings.bracket_formula, BracketFormula::Inclusive);
        assert_eq!(settings.tax_brackets.brackets().len(), 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_accept_decimal_strings() {
        let settings: TaxSettings = serde_json::from_str(
            r#"{
                "period": "2023-2024",
                "tax_brackets": [{"min_income": 0, "max_income": null, "rate": 10, "base_tax": 0}],
                "wfh_fixed_rate": "0.70",
                "vehicle_cents_per_km": "85",
                "meal_allowance": "35.65",
                "bracket_formula": "marginal"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.wfh_fixed_rate, dec!(0.70));
        assert_eq!(settings.vehicle_cents_per_km, dec!(85));
        assert_eq!(settings.bracket_formula, BracketFormula::Marginal);
    }

    #[test]
    fn test_settings_reject_negative_rates() {
        let schedule = TaxBracketSchedule::new(vec![crate::brackets::TaxBracket {
            min_income: 0,
            max_income: None,
            rate: dec!(10),
            base_tax: dec!(0),
        }])
        .unwrap();
        let mut settings = TaxSettings::new(TaxPeriod::new(2024), schedule);
        settings.wfh_fixed_rate = dec!(-0.1);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_wfh_rate_defaults_without_settings() {
        assert_eq!(wfh_rate(None), dec!(0.67));
    }
}
