use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tax_position_core::brackets::{TaxBracket, TaxBracketSchedule};
use tax_position_core::settings::{TaxPeriod, TaxSettings};
use tax_position_core::wfh::deduction::{self, ActualCosts, WfhInput, WfhMethod};
use tax_position_core::wfh::hours::validate_wfh_hours;
use tax_position_core::TaxEngineError;

fn settings_with_rate(rate: Decimal) -> TaxSettings {
    let schedule = TaxBracketSchedule::new(vec![TaxBracket {
        min_income: 0,
        max_income: None,
        rate: dec!(0),
        base_tax: dec!(0),
    }])
    .unwrap();
    let mut settings = TaxSettings::new(TaxPeriod::new(2024), schedule);
    settings.wfh_fixed_rate = rate;
    settings
}

// ===========================================================================
// Hours validation
// ===========================================================================

#[test]
fn test_hours_validation_table() {
    let cases = [
        (-1, false, true),
        (0, true, false),
        (1_000, true, false),
        (2_080, true, false),
        (2_081, true, true),
        (3_120, true, true),
        (3_121, false, true),
    ];
    for (hours, valid, has_message) in cases {
        let v = validate_wfh_hours(hours);
        assert_eq!(v.valid, valid, "hours {hours}");
        assert_eq!(v.message.is_some(), has_message, "hours {hours}");
    }
}

// ===========================================================================
// Dispatch
// ===========================================================================

#[test]
fn test_fixed_rate_uses_period_rate() {
    let settings = settings_with_rate(dec!(0.70));
    let input = WfhInput {
        method: WfhMethod::FixedRate,
        total_hours: 1_000,
        actual_costs: None,
        work_use_percentage: Decimal::ZERO,
    };
    let out = deduction::calculate_wfh_deduction(&input, Some(&settings)).unwrap();
    assert_eq!(out.result.rate_per_hour, dec!(0.70));
    assert_eq!(out.result.total_deduction, dec!(700));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_fixed_rate_scenario_with_default_rate() {
    let input = WfhInput {
        method: WfhMethod::FixedRate,
        total_hours: 1_200,
        actual_costs: None,
        work_use_percentage: Decimal::ZERO,
    };
    let out = deduction::calculate_wfh_deduction(&input, None).unwrap();
    assert_eq!(out.result.total_deduction, dec!(804.00));
}

#[test]
fn test_fixed_rate_refuses_out_of_range_hours() {
    let input = WfhInput {
        method: WfhMethod::FixedRate,
        total_hours: -10,
        actual_costs: None,
        work_use_percentage: Decimal::ZERO,
    };
    let err = deduction::calculate_wfh_deduction(&input, None).unwrap_err();
    match err {
        TaxEngineError::InvalidInput { field, reason } => {
            assert_eq!(field, "total_hours");
            assert!(reason.contains("negative"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_actual_cost_skips_hours_validation() {
    let input: WfhInput = serde_json::from_str(
        r#"{"method": "actual_cost", "total_hours": -5,
            "actual_costs": {"electricity": "300", "internet": "120"},
            "work_use_percentage": 50}"#,
    )
    .unwrap();
    let out = deduction::calculate_wfh_deduction(&input, None).unwrap();
    assert_eq!(out.result.total_deduction, dec!(210.00));
    assert_eq!(out.result.breakdown.len(), 2);
    assert_eq!(out.result.breakdown[0].label, "Electricity");
    assert_eq!(out.result.breakdown[0].amount, dec!(150.00));
    assert_eq!(out.result.breakdown[1].label, "Internet");
    assert_eq!(out.result.breakdown[1].amount, dec!(60.00));
}

#[test]
fn test_actual_cost_without_costs_is_permissive_zero() {
    let input: WfhInput =
        serde_json::from_str(r#"{"method": "actual_cost", "work_use_percentage": "80"}"#).unwrap();
    let out = deduction::calculate_wfh_deduction(&input, None).unwrap();
    assert_eq!(out.result.method, WfhMethod::ActualCost);
    assert_eq!(out.result.total_deduction, Decimal::ZERO);
    assert!(out.result.breakdown.is_empty());
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_fixed_rate_monotonic_in_hours(a in 0i64..=3_120, b in 0i64..=3_120, rate_cents in 0i64..500) {
        let rate = Decimal::new(rate_cents, 2);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let d_lo = deduction::calculate_wfh_fixed_rate(lo, rate).unwrap().total_deduction;
        let d_hi = deduction::calculate_wfh_fixed_rate(hi, rate).unwrap().total_deduction;
        prop_assert!(d_lo <= d_hi);
    }

    #[test]
    fn prop_actual_cost_breakdown_sums_exactly(
        costs in proptest::collection::vec(0i64..1_000_000, 6),
        pct_hundredths in 0i64..=10_000,
    ) {
        let c = |i: usize| Decimal::new(costs[i], 2);
        let actual = ActualCosts {
            electricity: c(0),
            internet: c(1),
            cleaning: c(2),
            phone_usage: c(3),
            stationery: c(4),
            furniture_depreciation: c(5),
        };
        let pct = Decimal::new(pct_hundredths, 2);
        let result = deduction::calculate_wfh_actual_cost(0, &actual, pct).unwrap();
        let sum: Decimal = result.breakdown.iter().map(|l| l.amount).sum();
        prop_assert_eq!(sum, result.total_deduction);
        prop_assert!(result.breakdown.iter().all(|l| !l.amount.is_zero()));
    }
}
