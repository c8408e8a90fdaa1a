use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::records::{Contribution, DeductionItem, IncomeItem, IncomeSource};
use crate::settings::{TaxPeriod, TaxSettings};
use crate::types::{checked_add, checked_sub, with_metadata, ComputationOutput, Money, Percentage};
use crate::TaxEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Records and settings for one period (and optionally one profile).
///
/// `settings` is `None` until the surrounding application has loaded the
/// period's configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInput {
    pub period: TaxPeriod,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub settings: Option<TaxSettings>,
    #[serde(default)]
    pub income: Vec<IncomeItem>,
    #[serde(default)]
    pub deductions: Vec<DeductionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeTotals {
    pub total: Money,
    pub by_source: BTreeMap<IncomeSource, Money>,
    pub tax_withheld: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionTotals {
    pub total: Money,
    pub count: u32,
    pub grey_area_total: Money,
    pub grey_area_count: u32,
}

/// Computed, ephemeral position. Always recomputed from records and the
/// current settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPosition {
    pub period: TaxPeriod,
    pub profile_id: Option<String>,
    pub total_income: Money,
    pub income_by_source: BTreeMap<IncomeSource, Money>,
    pub total_deductions: Money,
    pub deduction_count: u32,
    pub taxable_income: Money,
    pub tax_payable: Money,
    pub tax_withheld: Money,
    /// Withheld minus payable. Negative means an amount owing.
    pub estimated_refund: Money,
    pub effective_rate_pct: Percentage,
    pub marginal_rate_pct: Percentage,
    pub grey_area_total: Money,
    pub grey_area_count: u32,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub fn aggregate_income(items: &[IncomeItem]) -> TaxEngineResult<IncomeTotals> {
    let mut by_source: BTreeMap<IncomeSource, Money> = BTreeMap::new();
    let mut total = Decimal::ZERO;
    let mut tax_withheld = Decimal::ZERO;

    for item in items {
        let amount = item.amount();
        total = checked_add(total, amount, "income")?;
        tax_withheld = checked_add(tax_withheld, item.tax_withheld(), "tax_withheld")?;
        let source_total = by_source.entry(item.source()).or_insert(Decimal::ZERO);
        *source_total = checked_add(*source_total, amount, "income")?;
    }

    Ok(IncomeTotals {
        total,
        by_source,
        tax_withheld,
    })
}

/// Every deductible record counts towards `count`, zero-amount ones included.
pub fn aggregate_deductions(items: &[DeductionItem]) -> TaxEngineResult<DeductionTotals> {
    let mut totals = DeductionTotals {
        total: Decimal::ZERO,
        count: 0,
        grey_area_total: Decimal::ZERO,
        grey_area_count: 0,
    };

    for item in items.iter().filter(|i| i.is_deductible()) {
        let amount = item.amount();
        totals.total = checked_add(totals.total, amount, "deductions")?;
        totals.count += 1;
        if item.is_grey_area() {
            totals.grey_area_total = checked_add(totals.grey_area_total, amount, "deductions")?;
            totals.grey_area_count += 1;
        }
    }

    Ok(totals)
}

/// Income less deductions, floored at zero.
pub fn taxable_income(total_income: Money, total_deductions: Money) -> Money {
    total_income
        .saturating_sub(total_deductions)
        .max(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Compute taxable income and tax payable for a period.
///
/// Fails with [`TaxEngineError::SettingsNotLoaded`] when the period has no
/// settings yet, so that "not configured" is never reported as zero tax.
pub fn compute_position(input: &PositionInput) -> TaxEngineResult<ComputationOutput<TaxPosition>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let settings = input
        .settings
        .as_ref()
        .ok_or_else(|| TaxEngineError::SettingsNotLoaded {
            period: input.period.to_string(),
        })?;
    validate_position_input(input, settings)?;

    let income = aggregate_income(&input.income)?;
    let deductions = aggregate_deductions(&input.deductions)?;
    let taxable = taxable_income(income.total, deductions.total);

    let tax_payable = settings
        .tax_brackets
        .tax_payable(taxable, settings.bracket_formula)?;
    let marginal_rate_pct = settings
        .tax_brackets
        .resolve(taxable)
        .map(|b| b.rate)
        .unwrap_or(Decimal::ZERO);
    let effective_rate_pct = if taxable > Decimal::ZERO {
        tax_payable
            .checked_div(taxable)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| TaxEngineError::overflow("tax_payable"))?
    } else {
        Decimal::ZERO
    };
    let estimated_refund = checked_sub(income.tax_withheld, tax_payable, "tax_withheld")?;

    tracing::debug!(
        period = %input.period,
        income_records = input.income.len(),
        deduction_records = deductions.count,
        %taxable,
        %tax_payable,
        "computed tax position"
    );

    if deductions.total > income.total {
        warnings.push(format!(
            "Deductions of {} exceed total income of {}; taxable income floored at zero.",
            deductions.total, income.total
        ));
    }
    if deductions.grey_area_count > 0 {
        warnings.push(format!(
            "{} grey-area deduction(s) totalling {} are commonly reviewed; keep substantiating records.",
            deductions.grey_area_count, deductions.grey_area_total
        ));
    }

    let position = TaxPosition {
        period: input.period.clone(),
        profile_id: input.profile_id.clone(),
        total_income: income.total,
        income_by_source: income.by_source,
        total_deductions: deductions.total,
        deduction_count: deductions.count,
        taxable_income: taxable,
        tax_payable,
        tax_withheld: income.tax_withheld,
        estimated_refund,
        effective_rate_pct,
        marginal_rate_pct,
        grey_area_total: deductions.grey_area_total,
        grey_area_count: deductions.grey_area_count,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Tax position: income less deductions floored at zero, resolved against \
         the period's progressive bracket schedule",
        &serde_json::json!({
            "period": input.period.to_string(),
            "num_income_records": input.income.len(),
            "num_deduction_records": input.deductions.len(),
            "num_brackets": settings.tax_brackets.brackets().len(),
            "bracket_formula": settings.bracket_formula,
        }),
        warnings,
        elapsed,
        position,
    ))
}

fn validate_position_input(input: &PositionInput, settings: &TaxSettings) -> TaxEngineResult<()> {
    if settings.period != input.period {
        return Err(TaxEngineError::InvalidInput {
            field: "settings.period".into(),
            reason: format!(
                "Settings are for {} but records are for {}",
                settings.period, input.period
            ),
        });
    }
    settings.validate()
}
