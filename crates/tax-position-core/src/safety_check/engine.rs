use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::benchmarks::{classify_ratio, AuditRiskLevel, SafetyCheckConfig};
use crate::error::TaxEngineError;
use crate::records::{deductions_by_category, DeductionItem, ExpenseCategory};
use crate::types::{checked_add, lenient_amount_map, with_metadata, ComputationOutput, Money, Rate};
use crate::TaxEngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafetyCheckInput {
    /// Claimed totals per category. Blank or unparsable amounts read as zero.
    #[serde(default, deserialize_with = "lenient_amount_map")]
    pub deductions_by_category: BTreeMap<ExpenseCategory, Money>,
    #[serde(default)]
    pub occupation: Option<String>,
}

impl SafetyCheckInput {
    pub fn from_deductions(items: &[DeductionItem], occupation: Option<String>) -> TaxEngineResult<Self> {
        Ok(Self {
            deductions_by_category: deductions_by_category(items)?,
            occupation,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheckItem {
    pub benchmark_category: String,
    pub source_categories: Vec<ExpenseCategory>,
    pub claimed_amount: Money,
    pub benchmark_amount: Money,
    /// Claimed over benchmark; absent when the benchmark is zero.
    pub ratio: Option<Rate>,
    pub risk_level: AuditRiskLevel,
    pub grey_area: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheckOutput {
    pub occupation_profile: String,
    pub items: Vec<SafetyCheckItem>,
    pub overall_risk: AuditRiskLevel,
    pub grey_area_categories: Vec<ExpenseCategory>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Score claimed expenses against occupation benchmarks.
///
/// Categories are rolled up into benchmark buckets, each bucket is compared
/// with the occupation's norm, and the overall risk is the highest item
/// risk (low when there are no items).
pub fn evaluate(
    input: &SafetyCheckInput,
    config: &SafetyCheckConfig,
) -> TaxEngineResult<ComputationOutput<SafetyCheckOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    config.validate()?;
    let profile = config.resolve_profile(input.occupation.as_deref())?;
    if profile.fell_back {
        tracing::warn!(
            occupation = input.occupation.as_deref().unwrap_or_default(),
            "unrecognised occupation, using default benchmarks"
        );
        warnings.push(format!(
            "Occupation '{}' has no benchmark profile; default benchmarks used.",
            input.occupation.as_deref().unwrap_or_default()
        ));
    }

    // Roll categories up into benchmark buckets
    let mut buckets: BTreeMap<&str, (Money, Vec<ExpenseCategory>)> = BTreeMap::new();
    for (category, amount) in &input.deductions_by_category {
        match config.category_map.get(category) {
            Some(bucket) => {
                let entry = buckets
                    .entry(bucket.as_str())
                    .or_insert((Decimal::ZERO, Vec::new()));
                entry.0 = checked_add(entry.0, *amount, "deductions_by_category")?;
                entry.1.push(*category);
            }
            None => warnings.push(format!(
                "Category '{}' has no benchmark mapping and was not assessed.",
                category.label()
            )),
        }
    }

    let mut items: Vec<SafetyCheckItem> = Vec::with_capacity(buckets.len());
    for (bucket, (claimed, sources)) in buckets {
        let Some(benchmark) = config.benchmark_for(&profile, bucket) else {
            tracing::warn!(bucket, profile = profile.name, "no benchmark for category");
            warnings.push(format!(
                "No benchmark for '{bucket}' in profile '{}'; category not assessed.",
                profile.name
            ));
            continue;
        };

        let ratio = if benchmark > Decimal::ZERO {
            let ratio = claimed
                .checked_div(benchmark)
                .ok_or_else(|| TaxEngineError::overflow("deductions_by_category"))?;
            Some(ratio)
        } else {
            None
        };
        let grey_area = sources.iter().any(|c| c.is_grey_area());

        items.push(SafetyCheckItem {
            benchmark_category: bucket.to_string(),
            source_categories: sources,
            claimed_amount: claimed,
            benchmark_amount: benchmark,
            ratio,
            risk_level: classify_ratio(claimed, benchmark, &config.thresholds),
            grey_area,
        });
    }

    let overall_risk = items
        .iter()
        .map(|item| item.risk_level)
        .max()
        .unwrap_or(AuditRiskLevel::Low);

    let grey_area_categories: Vec<ExpenseCategory> = input
        .deductions_by_category
        .keys()
        .copied()
        .filter(|c| c.is_grey_area())
        .collect();

    let high_count = items
        .iter()
        .filter(|i| i.risk_level == AuditRiskLevel::High)
        .count();
    if high_count > 0 {
        warnings.push(format!(
            "{high_count} categor{} well above the occupation benchmark.",
            if high_count == 1 { "y is" } else { "ies are" }
        ));
    }

    tracing::debug!(
        profile = profile.name,
        items = items.len(),
        overall = ?overall_risk,
        "evaluated deduction safety check"
    );

    let output = SafetyCheckOutput {
        occupation_profile: profile.name.to_string(),
        items,
        overall_risk,
        grey_area_categories,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deduction safety check: aggregate by benchmark category, compare with \
         occupation norms, classify by claimed/benchmark ratio, overall = max risk",
        &serde_json::json!({
            "occupation": input.occupation,
            "num_categories": input.deductions_by_category.len(),
            "medium_above": config.thresholds.medium_above.to_string(),
            "high_above": config.thresholds.high_above.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
