pub mod brackets;
pub mod error;
pub mod records;
pub mod settings;
pub mod types;

#[cfg(feature = "position")]
pub mod position;

#[cfg(feature = "wfh")]
pub mod wfh;

#[cfg(feature = "safety_check")]
pub mod safety_check;

#[cfg(feature = "allowances")]
pub mod allowances;

pub use error::TaxEngineError;
pub use types::*;

/// Standard result type for all tax-position operations
pub type TaxEngineResult<T> = Result<T, TaxEngineError>;
