use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::types::{checked_add, percent_of, Money, Percentage};
use crate::TaxEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One progressive bracket. Bounds are whole currency units and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: u64,
    pub max_income: Option<u64>,
    /// Marginal rate on a 0–100 scale.
    pub rate: Percentage,
    /// Tax accumulated from all lower brackets.
    pub base_tax: Money,
}

impl TaxBracket {
    /// Whether `income` falls within this bracket's inclusive bounds.
    pub fn contains(&self, income: Decimal) -> bool {
        income >= Decimal::from(self.min_income)
            && self
                .max_income
                .map_or(true, |max| income <= Decimal::from(max))
    }
}

/// How the amount taxed inside the matched bracket is measured.
///
/// `Inclusive` counts the bracket's lower bound itself as taxable
/// (`income - min + 1`), which is the published formula when each bracket
/// starts one unit above the previous threshold. `Marginal` measures from
/// the lower bound (`income - min`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormula {
    #[default]
    Inclusive,
    Marginal,
}

/// A validated, ascending bracket schedule for one tax period.
///
/// Brackets start at zero, are contiguous without overlap, and exactly the
/// last bracket is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct TaxBracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl TaxBracketSchedule {
    pub fn new(brackets: Vec<TaxBracket>) -> TaxEngineResult<Self> {
        validate_brackets(&brackets)?;
        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn tax_payable(&self, taxable_income: Money, formula: BracketFormula) -> TaxEngineResult<Money> {
        tax_payable(taxable_income, &self.brackets, formula)
    }

    pub fn resolve(&self, taxable_income: Money) -> Option<&TaxBracket> {
        resolve_bracket(taxable_income, &self.brackets)
    }
}

impl TryFrom<Vec<TaxBracket>> for TaxBracketSchedule {
    type Error = TaxEngineError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<TaxBracketSchedule> for Vec<TaxBracket> {
    fn from(schedule: TaxBracketSchedule) -> Self {
        schedule.brackets
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Income used for the bracket lookup: floored at zero, then truncated to
/// whole units because bracket bounds are integers.
pub fn lookup_income(taxable_income: Money) -> Decimal {
    taxable_income.max(Decimal::ZERO).floor()
}

/// First bracket, in iteration order, containing the lookup income.
pub fn resolve_bracket(taxable_income: Money, brackets: &[TaxBracket]) -> Option<&TaxBracket> {
    let income = lookup_income(taxable_income);
    brackets.iter().find(|b| b.contains(income))
}

/// Resolve taxable income to tax payable against an ordered schedule.
///
/// `tax = base_tax + taxable_in_bracket * rate / 100` for the first matching
/// bracket. Only the lookup uses whole units; the amount taxed inside the
/// bracket keeps the cents. A schedule that leaves the income uncovered is a
/// configuration error, never a zero.
pub fn tax_payable(
    taxable_income: Money,
    brackets: &[TaxBracket],
    formula: BracketFormula,
) -> TaxEngineResult<Money> {
    let bracket = resolve_bracket(taxable_income, brackets).ok_or(TaxEngineError::NoMatchingBracket {
        taxable_income: lookup_income(taxable_income),
    })?;

    let income = taxable_income.max(Decimal::ZERO);
    let above_min = income - Decimal::from(bracket.min_income);
    let taxable_in_bracket = match formula {
        BracketFormula::Inclusive => checked_add(above_min, Decimal::ONE, "taxable_income")?,
        BracketFormula::Marginal => above_min,
    };

    let bracket_tax = percent_of(taxable_in_bracket, bracket.rate)
        .ok_or_else(|| TaxEngineError::overflow("taxable_income"))?;
    checked_add(bracket.base_tax, bracket_tax, "taxable_income")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn config_error(reason: String) -> TaxEngineError {
    TaxEngineError::InvalidConfiguration {
        component: "tax_brackets".into(),
        reason,
    }
}

fn validate_brackets(brackets: &[TaxBracket]) -> TaxEngineResult<()> {
    let first = brackets
        .first()
        .ok_or_else(|| config_error("Schedule must contain at least one bracket".into()))?;
    if first.min_income != 0 {
        return Err(config_error(format!(
            "First bracket must start at 0, starts at {}",
            first.min_income
        )));
    }

    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE_HUNDRED {
            return Err(config_error(format!(
                "Bracket {i} rate {} must be between 0 and 100",
                bracket.rate
            )));
        }
        if bracket.base_tax < Decimal::ZERO {
            return Err(config_error(format!("Bracket {i} base tax cannot be negative")));
        }

        let is_last = i + 1 == brackets.len();
        match (bracket.max_income, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(config_error(format!(
                    "Bracket {i} is unbounded but is not the last bracket"
                )));
            }
            (Some(_), true) => {
                return Err(config_error(
                    "Last bracket must be unbounded (max_income = null)".into(),
                ));
            }
            (Some(max), false) => {
                if max < bracket.min_income {
                    return Err(config_error(format!(
                        "Bracket {i} max_income {max} is below min_income {}",
                        bracket.min_income
                    )));
                }
                let next_min = brackets[i + 1].min_income;
                if max.checked_add(1) != Some(next_min) {
                    return Err(config_error(format!(
                        "Bracket {} must start at {} to follow bracket {i} without gap or overlap, starts at {next_min}",
                        i + 1,
                        max.saturating_add(1)
                    )));
                }
            }
        }
    }

    Ok(())
}
