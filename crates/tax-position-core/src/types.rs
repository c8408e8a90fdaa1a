use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TaxEngineError;
use crate::TaxEngineResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Ratios expressed as decimals (1.5 = 150% of benchmark).
pub type Rate = Decimal;

/// Percentages expressed on a 0–100 scale (19 = 19%).
pub type Percentage = Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round half-up to two decimal places for display.
///
/// Engine results are never rounded internally; this is only applied where a
/// figure is presented.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * pct / 100`, exact. `None` when the product leaves the decimal
/// range.
pub fn percent_of(amount: Money, pct: Percentage) -> Option<Money> {
    amount.checked_mul(pct).map(|product| product / HUNDRED)
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

pub fn checked_add(a: Money, b: Money, field: &str) -> TaxEngineResult<Money> {
    a.checked_add(b).ok_or_else(|| TaxEngineError::overflow(field))
}

pub fn checked_sub(a: Money, b: Money, field: &str) -> TaxEngineResult<Money> {
    a.checked_sub(b).ok_or_else(|| TaxEngineError::overflow(field))
}

pub fn checked_mul(a: Money, b: Decimal, field: &str) -> TaxEngineResult<Money> {
    a.checked_mul(b).ok_or_else(|| TaxEngineError::overflow(field))
}

/// Sum of `amounts`, failing on `field` instead of wrapping or panicking.
pub fn checked_sum<I>(amounts: I, field: &str) -> TaxEngineResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| checked_add(acc, amount, field))
}

/// Normalise a user-entered amount string to Money.
///
/// Accepts surrounding whitespace, a leading `$` and `,` thousands
/// separators. Empty, unparsable or negative input coerces to zero so that
/// partially-entered records never break aggregation.
pub fn parse_amount(raw: &str) -> Money {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    let cleaned: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let parsed = Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned));
    match parsed {
        Ok(value) if value >= Decimal::ZERO => value,
        Ok(value) => {
            tracing::warn!(amount = %value, "negative amount coerced to zero");
            Decimal::ZERO
        }
        Err(_) => {
            tracing::warn!(raw = %raw, "unparsable amount coerced to zero");
            Decimal::ZERO
        }
    }
}

/// Serde helper for record amounts: strings, numbers, `null` and a missing
/// field are all accepted. Use together with `#[serde(default)]`.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(coerce_amount(raw.unwrap_or_default()))
}

/// Serde helper for keyed amount tables such as per-category totals: each
/// value is read like a record amount, so one bad entry is zero rather than
/// a failed request.
pub fn lenient_amount_map<'de, D, K>(deserializer: D) -> Result<BTreeMap<K, Money>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
{
    let raw = BTreeMap::<K, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, coerce_amount(value)))
        .collect())
}

fn coerce_amount(value: serde_json::Value) -> Money {
    match value {
        serde_json::Value::String(s) => parse_amount(&s),
        serde_json::Value::Number(n) => parse_amount(&n.to_string()),
        serde_json::Value::Null => Decimal::ZERO,
        other => {
            tracing::warn!(value = %other, "non-numeric amount coerced to zero");
            Decimal::ZERO
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
