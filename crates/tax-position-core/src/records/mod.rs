//! Income and deduction records as supplied by the surrounding application.
//!
//! Each record kind is a variant of a tagged union selected by its `kind`
//! field. Every variant exposes the amount it contributes to its aggregate
//! through [`Contribution`].

pub mod deductions;
pub mod income;

pub use deductions::{deductions_by_category, DeductionItem, ExpenseCategory};
pub use income::{IncomeItem, IncomeSource};

use crate::types::Money;

/// The amount a record adds to its period aggregate.
pub trait Contribution {
    fn amount(&self) -> Money;
}
