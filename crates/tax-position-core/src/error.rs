use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxEngineError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid configuration: {component}: {reason}")]
    InvalidConfiguration { component: String, reason: String },

    /// No settings have been loaded for the period yet. Callers must not
    /// read this as "no tax owed".
    #[error("Tax settings not loaded for period {period}")]
    SettingsNotLoaded { period: String },

    #[error("No tax bracket covers taxable income {taxable_income}")]
    NoMatchingBracket { taxable_income: Decimal },

    #[error("No benchmark profile for occupation '{occupation}' and no default profile configured")]
    MissingBenchmarkProfile { occupation: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TaxEngineError {
    fn from(e: serde_json::Error) -> Self {
        TaxEngineError::SerializationError(e.to_string())
    }
}

impl TaxEngineError {
    /// Arithmetic on `field` left the range of a 96-bit decimal.
    pub fn overflow(field: &str) -> Self {
        TaxEngineError::InvalidInput {
            field: field.to_string(),
            reason: "Amount is too large to compute exactly".into(),
        }
    }
}
