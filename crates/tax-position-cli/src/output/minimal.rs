use serde_json::Value;

use super::plain;

/// Headline field per command, in priority order.
const HEADLINE_KEYS: [&str; 7] = [
    "tax_payable",
    "total_deduction",
    "overall_risk",
    "deduction",
    "excess_total",
    "valid",
    "taxable_income",
];

/// Print only the headline answer of a computation.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        let headline = HEADLINE_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
        if let Some(val) = headline {
            println!("{}", plain(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result));
}
