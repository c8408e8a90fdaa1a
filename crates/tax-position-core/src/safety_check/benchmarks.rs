use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::records::ExpenseCategory;
use crate::types::{Money, Rate};
use crate::TaxEngineResult;

/// Occupation profile used when the user's occupation is absent or unknown.
pub const DEFAULT_OCCUPATION: &str = "default";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuditRiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Ratio cut-offs of claimed to benchmark amount.
///
/// `ratio <= medium_above` is low, `ratio <= high_above` is medium, anything
/// higher is high.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium_above: Rate,
    pub high_above: Rate,
}

/// Benchmark data injected by the surrounding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheckConfig {
    /// Expense category to benchmark category (many-to-few).
    pub category_map: BTreeMap<ExpenseCategory, String>,
    /// Occupation code to per-benchmark-category norm.
    pub occupations: BTreeMap<String, BTreeMap<String, Money>>,
    pub thresholds: RiskThresholds,
}

/// The occupation profile chosen for an evaluation.
#[derive(Debug, Clone)]
pub struct ResolvedProfile<'a> {
    pub name: &'a str,
    pub benchmarks: &'a BTreeMap<String, Money>,
    pub fell_back: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

impl SafetyCheckConfig {
    pub fn validate(&self) -> TaxEngineResult<()> {
        let t = &self.thresholds;
        if t.medium_above < Decimal::ZERO || t.high_above < t.medium_above {
            return Err(config_error(
                "thresholds",
                format!(
                    "Thresholds must satisfy 0 <= medium_above <= high_above, got {} and {}",
                    t.medium_above, t.high_above
                ),
            ));
        }
        if let Some((category, _)) = self.category_map.iter().find(|(_, b)| b.trim().is_empty()) {
            return Err(config_error(
                "category_map",
                format!("Category {:?} maps to an empty benchmark category", category),
            ));
        }
        for (occupation, table) in &self.occupations {
            if let Some((bucket, value)) = table.iter().find(|(_, v)| **v < Decimal::ZERO) {
                return Err(config_error(
                    "occupations",
                    format!("Benchmark {occupation}/{bucket} cannot be negative, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Find the occupation's benchmark table, case-insensitively, falling
    /// back to the `default` profile.
    pub fn resolve_profile(&self, occupation: Option<&str>) -> TaxEngineResult<ResolvedProfile<'_>> {
        let requested = occupation.map(str::trim).filter(|code| !code.is_empty());

        if let Some(code) = requested {
            if let Some((name, benchmarks)) = self.find_occupation(code) {
                return Ok(ResolvedProfile {
                    name,
                    benchmarks,
                    fell_back: false,
                });
            }
        }

        self.find_occupation(DEFAULT_OCCUPATION)
            .map(|(name, benchmarks)| ResolvedProfile {
                name,
                benchmarks,
                fell_back: requested.is_some(),
            })
            .ok_or_else(|| TaxEngineError::MissingBenchmarkProfile {
                occupation: requested.unwrap_or(DEFAULT_OCCUPATION).to_string(),
            })
    }

    /// Benchmark for a bucket in the given profile, then in `default`.
    pub fn benchmark_for(&self, profile: &ResolvedProfile<'_>, bucket: &str) -> Option<Money> {
        profile.benchmarks.get(bucket).copied().or_else(|| {
            self.find_occupation(DEFAULT_OCCUPATION)
                .and_then(|(_, table)| table.get(bucket).copied())
        })
    }

    fn find_occupation(&self, code: &str) -> Option<(&str, &BTreeMap<String, Money>)> {
        self.occupations
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(code))
            .map(|(name, table)| (name.as_str(), table))
    }
}

fn config_error(component: &str, reason: String) -> TaxEngineError {
    TaxEngineError::InvalidConfiguration {
        component: format!("safety_check.{component}"),
        reason,
    }
}

/// Classify a claim against its benchmark.
///
/// A zero benchmark means any positive claim is high risk. A bound beyond the
/// decimal range is above every claim.
pub fn classify_ratio(claimed: Money, benchmark: Money, thresholds: &RiskThresholds) -> AuditRiskLevel {
    let within = |threshold: Rate| {
        benchmark
            .checked_mul(threshold)
            .map_or(true, |bound| claimed <= bound)
    };
    if within(thresholds.medium_above) {
        AuditRiskLevel::Low
    } else if within(thresholds.high_above) {
        AuditRiskLevel::Medium
    } else {
        AuditRiskLevel::High
    }
}
